//! Built-in action behaviors: pulse propagation, periodic senders, and
//! collision detection.

use worldline_math::{separation, Separation};

use super::action::{ActError, Action, ActionState, Cause, CollisionState, PulseState};
use super::delta::DeltaWorld;
use super::event::Event;
use super::object::ActionRef;
use super::types::ObjName;
use super::world::WorldView;

/// One firing of a `Sender`: emit the pulse for this period and schedule the
/// successor sender one period later.
pub(crate) fn send_pulse(
    view: &mut DeltaWorld<'_>,
    name: &str,
    owner: &ObjName,
    start: f64,
    period: f64,
    index: u64,
) -> Result<ActionState, ActError> {
    view.add_action(owner, Action::pulse(name.to_string(), start))?;
    view.add_action(
        owner,
        Action::sender_indexed(name.to_string(), start + period, period, index + 1),
    )?;
    Ok(ActionState::None)
}

/// One firing of a `Pulse`: classify every object against the wavefront from
/// the source event.
///
/// Objects found inside the cone on first sighting were passed long ago and
/// become impossible; tracked objects slipping inside mean the scheduler
/// overstepped the reception and must bisect.
pub(crate) fn propagate_pulse(
    view: &mut DeltaWorld<'_>,
    cause: &Cause,
    owner: &ObjName,
    state: ActionState,
) -> Result<ActionState, ActError> {
    let mut st = match state {
        ActionState::Pulse(st) => st,
        _ => PulseState::default(),
    };
    let source = match st.source {
        Some(source) => source,
        None => {
            let source = view.state_of(owner)?;
            st.source = Some(source);
            st.impossible.insert(owner.clone());
            source
        }
    };
    let eps = view.eps();
    for name in view.object_names() {
        if st.impossible.contains(&name) {
            continue;
        }
        let other = view.state_of(&name)?;
        let tracked = st.tracked.contains(&name);
        match separation(other.r, source.r, eps) {
            Separation::Lightlike => {
                let sender_state = view.state_of(owner)?;
                view.add_event(Event {
                    name: cause.name.clone(),
                    cause: cause.clone(),
                    sender: owner.clone(),
                    sender_state,
                    receiver: name.clone(),
                    receiver_state: other,
                });
                st.tracked.remove(&name);
                st.impossible.insert(name);
            }
            Separation::Timelike => {
                if other.r.t < source.r.t {
                    // Pre-emission history; nothing to do yet.
                    continue;
                }
                if tracked {
                    return Err(ActError::RetrySmallerStep { hint: None });
                }
                st.impossible.insert(name);
            }
            Separation::Spacelike => {
                if !tracked {
                    st.tracked.insert(name);
                }
            }
        }
    }
    Ok(ActionState::Pulse(st))
}

/// One firing of a `DetectCollision`: sample distances to the targets and
/// emit a `"collide"` event on each closing approach within `2·eps`.
///
/// Collisions are only observed at already-scheduled instants; the detector
/// does not subdivide time to localize the exact contact moment.
pub(crate) fn detect_collisions(
    view: &mut DeltaWorld<'_>,
    cause: &Cause,
    owner: &ObjName,
    targets: &[ObjName],
    state: ActionState,
) -> Result<ActionState, ActError> {
    let mut st = match state {
        ActionState::Collision(st) => st,
        _ => CollisionState::default(),
    };
    let me = view.state_of(owner)?;
    let threshold = 2.0 * view.eps();
    for target in targets {
        if target == owner {
            continue;
        }
        // A target may not have entered the world yet.
        let Ok(other) = view.state_of(target) else { continue };
        let distance = (me.r.spatial() - other.r.spatial()).norm();
        if st.generated.contains(target) {
            if distance > threshold {
                st.generated.remove(target);
            }
        } else if distance < threshold {
            view.add_event(Event {
                name: "collide".to_string(),
                cause: cause.clone(),
                sender: owner.clone(),
                sender_state: me,
                receiver: target.clone(),
                receiver_state: other,
            });
            st.generated.insert(target.clone());
        }
    }
    Ok(ActionState::Collision(st))
}

/// The synthetic end edge of a windowed action: mark the target complete and
/// log the end event for loud actions.
pub(crate) fn finish_action(
    view: &mut DeltaWorld<'_>,
    owner: &ObjName,
    target: &ActionRef,
) -> Result<ActionState, ActError> {
    view.complete(target.clone());
    if view.log_actions() {
        if let Some(original) = view.find_action(target) {
            if !original.cause.silent {
                let me = view.state_of(owner)?;
                view.add_event(Event {
                    name: format!("{}-end", original.cause.name),
                    cause: original.cause.clone(),
                    sender: owner.clone(),
                    sender_state: me,
                    receiver: owner.clone(),
                    receiver_state: me,
                });
            }
        }
    }
    Ok(ActionState::None)
}
