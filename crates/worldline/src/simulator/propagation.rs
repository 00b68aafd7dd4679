//! Advancing an object's world-frame state to a target proper or coordinate
//! time, walking its motion map and synthesizing inertial segments for the
//! gaps.

use worldline_math::{KinematicsError, State, Vector3, Vector4};

use super::frame::Frame;
use super::motion::Motion;
use super::object::Obj;
use super::world::SimulationError;

/// Whether a motion contributes to an advance that currently sits at
/// `tau_now`. Point motions exactly at `tau_now` are considered already
/// applied.
fn contributes(motion: &Motion, tau_now: f64) -> bool {
    let start = motion.tau_start();
    let end = motion.tau_end();
    if start == end {
        start > tau_now
    } else {
        end > tau_now
    }
}

/// Inertial coasting at the current velocity until proper time `tau_to`.
fn coast_to_proper_time(cur: &State, tau_to: f64) -> Result<State, KinematicsError> {
    let frame = Frame::comoving(cur);
    let local = State::new(
        Vector4::from_parts(tau_to - cur.tau, Vector3::ZERO),
        Vector3::ZERO,
        tau_to,
    );
    frame.to_origin(&local)
}

/// World-frame state of `obj` at proper time `tau_target`.
pub(crate) fn advance_to_proper_time(
    obj: &Obj,
    start: &State,
    tau_target: f64,
    eps: f64,
) -> Result<State, SimulationError> {
    let mut cur = *start;
    if tau_target <= cur.tau {
        return Ok(cur);
    }
    for motion in obj.motions() {
        if !contributes(motion, cur.tau) {
            continue;
        }
        // A point motion exactly at the target still applies (the advance
        // interval is closed); anything later does not.
        let is_point = motion.tau_start() == motion.tau_end();
        if motion.tau_start() > tau_target || (!is_point && motion.tau_start() >= tau_target) {
            break;
        }
        if motion.tau_start() > cur.tau {
            cur = coast_to_proper_time(&cur, motion.tau_start())?;
        }
        let tau_to = motion.tau_end().min(tau_target);
        let frame = Frame::comoving(&cur);
        let local = motion.move_until_proper_time(&frame, cur.tau, tau_to)?;
        cur = frame.to_origin(&local)?;
        if cur.tau >= tau_target {
            break;
        }
    }
    if cur.tau < tau_target {
        cur = coast_to_proper_time(&cur, tau_target)?;
    }
    debug_assert!((cur.tau - tau_target).abs() <= eps.max(1e-12));
    cur.tau = tau_target;
    Ok(cur)
}

/// World-frame state of `obj` at coordinate time `t_target`. The returned
/// time component is exactly `t_target`.
pub(crate) fn advance_to_coordinate_time(
    obj: &Obj,
    start: &State,
    t_target: f64,
    eps: f64,
) -> Result<State, SimulationError> {
    let mut cur = *start;
    if t_target <= cur.r.t {
        cur.r.t = t_target;
        return Ok(cur);
    }
    for motion in obj.motions() {
        if !contributes(motion, cur.tau) {
            continue;
        }
        if motion.tau_start() > cur.tau {
            // Inertial gap up to the segment start.
            let gap = Motion::Inertial { tau_start: cur.tau, tau_end: motion.tau_start() };
            if step_segment(&mut cur, &gap, t_target)? {
                cur.r.t = t_target;
                return Ok(cur);
            }
        }
        if step_segment(&mut cur, motion, t_target)? {
            cur.r.t = t_target;
            return Ok(cur);
        }
    }
    let tail = Motion::Inertial { tau_start: cur.tau, tau_end: f64::INFINITY };
    step_segment(&mut cur, &tail, t_target)?;
    debug_assert!((cur.r.t - t_target).abs() <= eps.max(1e-12));
    cur.r.t = t_target;
    Ok(cur)
}

/// Advance through one segment; returns true when the target coordinate time
/// was reached inside it (rather than the segment ending first).
fn step_segment(cur: &mut State, motion: &Motion, t_target: f64) -> Result<bool, KinematicsError> {
    let frame = Frame::comoving(cur);
    let local = motion.move_until_coordinate_time(&frame, cur.tau, t_target)?;
    let reached = match motion {
        Motion::AbruptVelocityChange { .. } => false,
        _ => local.tau < motion.tau_end(),
    };
    *cur = frame.to_origin(&local)?;
    Ok(reached)
}
