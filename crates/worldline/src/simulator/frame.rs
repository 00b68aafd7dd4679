//! Coordinate frames and state transforms.

use serde::{Deserialize, Serialize};
use worldline_math::{
    lorentz_transform, lorentz_transform_inv, observed_added_velocity,
    transformed_added_velocity, KinematicsError, State, Vector3, Vector4,
};

/// The origin 4-position and velocity of a coordinate system relative to the
/// world origin frame. `|v| < 1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub r: Vector4,
    pub v: Vector3,
}

impl Frame {
    pub const ORIGIN: Frame = Frame { r: Vector4::ZERO, v: Vector3::ZERO };

    pub fn new(r: Vector4, v: Vector3) -> Self {
        Self { r, v }
    }

    /// The inertial frame momentarily sharing a state's position and velocity.
    pub fn comoving(state: &State) -> Self {
        Self { r: state.r, v: state.v }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }

    /// Express a state given in this frame in the origin frame.
    pub fn to_origin(&self, s: &State) -> Result<State, KinematicsError> {
        if self.is_origin() {
            return Ok(*s);
        }
        Ok(State {
            r: lorentz_transform_inv(self.v, s.r)? + self.r,
            v: observed_added_velocity(self.v, s.v)?,
            tau: s.tau,
        })
    }

    /// Express an origin-frame state in this frame.
    pub fn from_origin(&self, s: &State) -> Result<State, KinematicsError> {
        if self.is_origin() {
            return Ok(*s);
        }
        Ok(State {
            r: lorentz_transform(self.v, s.r - self.r)?,
            v: transformed_added_velocity(self.v, s.v)?,
            tau: s.tau,
        })
    }
}

/// Transform a state from frame `from` to frame `to`, routing through the
/// origin frame. Proper time is preserved verbatim.
pub fn transform(s: &State, from: &Frame, to: &Frame) -> Result<State, KinematicsError> {
    if from == to {
        return Ok(*s);
    }
    to.from_origin(&from.to_origin(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> State {
        State::new(
            Vector4::new(2.0, 1.0, -0.5, 0.25),
            Vector3::new(0.1, 0.2, -0.1),
            3.0,
        )
    }

    fn close(a: &State, b: &State, eps: f64) -> bool {
        (a.r - b.r).spatial().norm() < eps
            && (a.r.t - b.r.t).abs() < eps
            && (a.v - b.v).norm() < eps
            && (a.tau - b.tau).abs() < eps
    }

    #[test]
    fn identity_transform_is_exact() {
        let f = Frame::new(Vector4::new(1.0, 0.5, 0.0, 0.0), Vector3::new(0.3, 0.0, 0.1));
        let s = sample_state();
        assert_eq!(transform(&s, &f, &f).unwrap(), s);
    }

    #[test]
    fn round_trip_preserves_state() {
        let a = Frame::new(Vector4::new(0.0, 1.0, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0));
        let b = Frame::new(Vector4::new(2.0, 0.0, 1.0, 0.0), Vector3::new(-0.2, 0.3, 0.0));
        let s = sample_state();
        let there = transform(&s, &a, &b).unwrap();
        let back = transform(&there, &b, &a).unwrap();
        assert!(close(&back, &s, 1e-10));
    }

    #[test]
    fn three_frame_cycle_preserves_state() {
        let a = Frame::new(Vector4::new(0.0, 1.0, 0.0, 0.0), Vector3::new(0.4, 0.0, 0.0));
        let b = Frame::new(Vector4::new(1.0, 0.0, -1.0, 0.0), Vector3::new(0.0, 0.5, 0.0));
        let c = Frame::ORIGIN;
        let s = sample_state();
        let cycled = transform(
            &transform(&transform(&s, &a, &b).unwrap(), &b, &c).unwrap(),
            &c,
            &a,
        )
        .unwrap();
        assert!(close(&cycled, &s, 1e-10));
    }

    #[test]
    fn proper_time_is_invariant() {
        let a = Frame::new(Vector4::ZERO, Vector3::new(0.7, 0.0, 0.0));
        let s = sample_state();
        assert_eq!(transform(&s, &a, &Frame::ORIGIN).unwrap().tau, s.tau);
    }
}
