//! Closed-form special-relativity kinematics (c = 1).
//!
//! Pure functions over plain value types:
//! - `gamma`: the Lorentz factor
//! - `observed_added_velocity` / `transformed_added_velocity`: Einstein
//!   velocity composition in three dimensions
//! - `lorentz_transform` / `lorentz_transform_inv`: 4-vector boosts
//! - `acceleration_at_proper_time` / `acceleration_at_coordinate_time`:
//!   hyperbolic motion under constant proper acceleration, parameterised by
//!   proper or coordinate time
//! - `separation`: interval classification between two events

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod vector;

pub use vector::{Vector3, Vector4};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KinematicsError {
    #[error("frame speed {speed} is at or above the speed of light")]
    LightspeedFrame { speed: f64 },
}

/// A spacetime position, velocity, and proper time, expressed in some frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    pub r: Vector4,
    pub v: Vector3,
    pub tau: f64,
}

impl State {
    pub fn new(r: Vector4, v: Vector3, tau: f64) -> Self {
        Self { r, v, tau }
    }
}

/// Sign of the interval `t² − |r|²` between two events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separation {
    Timelike,
    Lightlike,
    Spacelike,
}

/// Lorentz factor `1/√(1 − v²)`.
pub fn gamma(speed: f64) -> Result<f64, KinematicsError> {
    if speed.abs() >= 1.0 {
        return Err(KinematicsError::LightspeedFrame { speed });
    }
    Ok(1.0 / (1.0 - speed * speed).sqrt())
}

/// Velocity observed in the rest frame, given `u_prime` measured in a frame
/// moving at `v_frame`.
pub fn observed_added_velocity(
    v_frame: Vector3,
    u_prime: Vector3,
) -> Result<Vector3, KinematicsError> {
    let g = gamma(v_frame.norm())?;
    let d = v_frame.dot(u_prime);
    Ok((u_prime / g + v_frame + v_frame * (d * g / (g + 1.0))) / (1.0 + d))
}

/// Velocity measured in a frame moving at `v_frame`, given `u` observed in
/// the rest frame. Inverse of [`observed_added_velocity`].
pub fn transformed_added_velocity(
    v_frame: Vector3,
    u: Vector3,
) -> Result<Vector3, KinematicsError> {
    observed_added_velocity(-v_frame, u)
}

/// Boost a 4-vector into a frame moving at `v` relative to the rest frame.
pub fn lorentz_transform(v: Vector3, r: Vector4) -> Result<Vector4, KinematicsError> {
    let v2 = v.norm_squared();
    if v2 == 0.0 {
        return Ok(r);
    }
    let g = gamma(v2.sqrt())?;
    let x = r.spatial();
    let vx = v.dot(x);
    let t = g * (r.t - vx);
    let spatial = x + v * ((g - 1.0) * vx / v2 - g * r.t);
    Ok(Vector4::from_parts(t, spatial))
}

/// Inverse boost: the boost direction is negated.
pub fn lorentz_transform_inv(v: Vector3, r: Vector4) -> Result<Vector4, KinematicsError> {
    lorentz_transform(-v, r)
}

/// State after proper time `tau` under constant proper acceleration `a0`,
/// expressed in the co-moving frame at the start of the motion.
///
/// For magnitude `α` and direction `n̂`: position `n̂·(cosh(ατ) − 1)/α`, time
/// `sinh(ατ)/α`, velocity `n̂·tanh(ατ)`. `a0 = 0` degenerates to rest.
pub fn acceleration_at_proper_time(a0: Vector3, tau: f64) -> State {
    let alpha = a0.norm();
    if alpha == 0.0 {
        return State::new(Vector4::from_parts(tau, Vector3::ZERO), Vector3::ZERO, tau);
    }
    let n = a0 / alpha;
    let at = alpha * tau;
    State::new(
        Vector4::from_parts(at.sinh() / alpha, n * ((at.cosh() - 1.0) / alpha)),
        n * at.tanh(),
        tau,
    )
}

/// State after coordinate time `t` (measured in the frame the motion started
/// in, at rest) under constant proper acceleration `a0`. The time component of
/// the result is exactly `t`; the proper time is `asinh(αt)/α`.
pub fn acceleration_at_coordinate_time(a0: Vector3, t: f64) -> State {
    let alpha = a0.norm();
    if alpha == 0.0 {
        return State::new(Vector4::from_parts(t, Vector3::ZERO), Vector3::ZERO, t);
    }
    let tau = (alpha * t).asinh() / alpha;
    let mut state = acceleration_at_proper_time(a0, tau);
    state.r.t = t;
    state
}

/// The general boosted-start case: the motion begins in a frame moving at `v`
/// relative to the frame `t` is measured in. Solves for the proper time `τ`
/// elapsed on the accelerating worldline when coordinate time `t` has elapsed
/// in the outer frame, and returns the state in the starting (co-moving)
/// frame at that `τ`.
///
/// With `w = v·n̂`, `γ = γ(|v|)` and `q = αt/γ`:
/// `τ = asinh((−w·√(q² + 2qw + 1) + w + q)/(1 − w²))/α`
/// (negative square-root branch). `v = 0` reduces to
/// [`acceleration_at_coordinate_time`]; `a0 = 0` reduces to a pure time
/// dilation of the inertial worldline.
pub fn acceleration_at_coordinate_time_boosted(
    a0: Vector3,
    t: f64,
    v: Vector3,
) -> Result<State, KinematicsError> {
    let speed = v.norm();
    if speed == 0.0 {
        return Ok(acceleration_at_coordinate_time(a0, t));
    }
    let g = gamma(speed)?;
    let alpha = a0.norm();
    if alpha == 0.0 {
        let dtau = t / g;
        return Ok(State::new(
            Vector4::from_parts(dtau, Vector3::ZERO),
            Vector3::ZERO,
            dtau,
        ));
    }
    let n = a0 / alpha;
    let w = v.dot(n);
    let q = alpha * t / g;
    let s = (-w * (q * q + 2.0 * q * w + 1.0).sqrt() + w + q) / (1.0 - w * w);
    let tau = s.asinh() / alpha;
    Ok(acceleration_at_proper_time(a0, tau))
}

/// Classify the interval between two events.
///
/// The lightlike band is `| |Δt| − |Δr| | ≤ eps`, a time-scale tolerance wide
/// enough for an `eps`-bounded root search on a worldline to land inside it.
pub fn separation(r1: Vector4, r2: Vector4, eps: f64) -> Separation {
    let dt = (r1.t - r2.t).abs();
    let dr = (r1.spatial() - r2.spatial()).norm();
    let m = dt - dr;
    if m > eps {
        Separation::Timelike
    } else if m < -eps {
        Separation::Spacelike
    } else {
        Separation::Lightlike
    }
}
