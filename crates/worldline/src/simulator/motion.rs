//! Worldline segments: inertial coasting, abrupt velocity changes, and
//! longitudinal constant-proper-acceleration.

use serde::{Deserialize, Serialize};
use worldline_math::{
    acceleration_at_coordinate_time_boosted, acceleration_at_proper_time, gamma, KinematicsError,
    State, Vector3, Vector4,
};

use super::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Motion {
    /// The object rests at the origin of its co-moving frame; in the world
    /// frame it keeps whatever velocity the previous segment left it with.
    Inertial { tau_start: f64, tau_end: f64 },
    /// Instantaneous switch to velocity `v`, expressed in the previous
    /// co-moving frame. Zero proper-time duration.
    AbruptVelocityChange { tau_start: f64, v: Vector3 },
    /// Constant proper acceleration `a` in the momentarily co-moving frame at
    /// the segment start; a hyperbolic worldline.
    LongitudinalAcceleration { tau_start: f64, tau_end: f64, a: Vector3 },
}

impl Motion {
    pub fn tau_start(&self) -> f64 {
        match self {
            Motion::Inertial { tau_start, .. } => *tau_start,
            Motion::AbruptVelocityChange { tau_start, .. } => *tau_start,
            Motion::LongitudinalAcceleration { tau_start, .. } => *tau_start,
        }
    }

    pub fn tau_end(&self) -> f64 {
        match self {
            Motion::Inertial { tau_end, .. } => *tau_end,
            Motion::AbruptVelocityChange { tau_start, .. } => *tau_start,
            Motion::LongitudinalAcceleration { tau_end, .. } => *tau_end,
        }
    }

    /// The object's state at proper time `tau_to`, expressed in a frame
    /// co-moving with the object at `tau_now`. The returned `tau` equals
    /// `tau_to` (reverse queries are permitted).
    pub fn move_until_proper_time(
        &self,
        _frame: &Frame,
        tau_now: f64,
        tau_to: f64,
    ) -> Result<State, KinematicsError> {
        match self {
            Motion::Inertial { .. } => Ok(State::new(
                Vector4::from_parts(tau_to - tau_now, Vector3::ZERO),
                Vector3::ZERO,
                tau_to,
            )),
            Motion::AbruptVelocityChange { tau_start, v } => {
                Ok(State::new(Vector4::ZERO, *v, *tau_start))
            }
            Motion::LongitudinalAcceleration { a, .. } => {
                let mut s = acceleration_at_proper_time(*a, tau_to - tau_now);
                s.tau = tau_to;
                Ok(s)
            }
        }
    }

    /// The object's state when the world coordinate time reaches `t`,
    /// expressed in a frame co-moving with the object at `tau_now` -- or the
    /// state at the segment end if that comes first (the returned `tau` is
    /// then exactly `tau_end`).
    pub fn move_until_coordinate_time(
        &self,
        frame: &Frame,
        tau_now: f64,
        t: f64,
    ) -> Result<State, KinematicsError> {
        let dt = t - frame.r.t;
        match self {
            Motion::Inertial { tau_end, .. } => {
                let g = gamma(frame.v.norm())?;
                let dtau = dt / g;
                if dtau >= tau_end - tau_now {
                    Ok(State::new(
                        Vector4::from_parts(tau_end - tau_now, Vector3::ZERO),
                        Vector3::ZERO,
                        *tau_end,
                    ))
                } else {
                    Ok(State::new(
                        Vector4::from_parts(dtau, Vector3::ZERO),
                        Vector3::ZERO,
                        tau_now + dtau,
                    ))
                }
            }
            Motion::AbruptVelocityChange { tau_start, v } => {
                Ok(State::new(Vector4::ZERO, *v, *tau_start))
            }
            Motion::LongitudinalAcceleration { tau_end, a, .. } => {
                let solved = acceleration_at_coordinate_time_boosted(*a, dt, frame.v)?;
                let dtau_max = tau_end - tau_now;
                if solved.tau >= dtau_max {
                    let mut capped = acceleration_at_proper_time(*a, dtau_max);
                    capped.tau = *tau_end;
                    Ok(capped)
                } else {
                    Ok(State::new(solved.r, solved.v, tau_now + solved.tau))
                }
            }
        }
    }
}
