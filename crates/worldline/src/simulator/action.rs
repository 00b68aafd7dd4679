//! Action records, causes, behaviors, and the opaque per-action state token.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use worldline_math::State;

use super::behaviors;
use super::delta::DeltaWorld;
use super::object::ActionRef;
use super::types::ObjName;
use super::world::SimulationError;

// ============================================================================
// Cause metadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub name: String,
    /// Silent actions never log start/end edge events.
    pub silent: bool,
    pub kind: CauseKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseKind {
    Marker,
    Sender,
    Pulse,
    Collision,
    Finish,
    Custom,
}

// ============================================================================
// Action records
// ============================================================================

/// A scheduled action on an object's worldline, active over the proper-time
/// window `[tau_start, tau_end]` (a single instant when the two coincide).
#[derive(Debug, Clone)]
pub struct Action {
    pub tau_start: f64,
    pub tau_end: f64,
    pub cause: Cause,
    pub kind: ActionKind,
}

#[derive(Debug, Clone)]
pub enum ActionKind {
    /// No behavior; fires one event.
    Marker,
    /// Emits one pulse per period and reschedules itself.
    Sender { start: f64, period: f64, index: u64 },
    /// A spherical lightlike wavefront from the source event.
    Pulse,
    /// Samples distances to the targets at every committed instant.
    DetectCollision { targets: Vec<ObjName> },
    /// Internal end edge of a windowed action.
    Finish { target: ActionRef },
    /// User-supplied behavior.
    Custom(Arc<dyn ActionBehavior>),
}

impl Action {
    pub fn marker(name: impl Into<String>, tau: f64) -> Self {
        Self {
            tau_start: tau,
            tau_end: tau,
            cause: Cause { name: name.into(), silent: false, kind: CauseKind::Marker },
            kind: ActionKind::Marker,
        }
    }

    pub fn sender(name: impl Into<String>, start: f64, period: f64) -> Self {
        Self::sender_indexed(name.into(), start, period, 0)
    }

    pub(crate) fn sender_indexed(name: String, start: f64, period: f64, index: u64) -> Self {
        Self {
            tau_start: start,
            tau_end: start,
            cause: Cause { name, silent: true, kind: CauseKind::Sender },
            kind: ActionKind::Sender { start, period, index },
        }
    }

    pub fn pulse(name: impl Into<String>, tau: f64) -> Self {
        Self {
            tau_start: tau,
            tau_end: f64::INFINITY,
            cause: Cause { name: name.into(), silent: true, kind: CauseKind::Pulse },
            kind: ActionKind::Pulse,
        }
    }

    pub fn detect_collision(tau: f64, until: f64, targets: Vec<ObjName>) -> Self {
        Self {
            tau_start: tau,
            tau_end: until,
            cause: Cause {
                name: "collide".to_string(),
                silent: true,
                kind: CauseKind::Collision,
            },
            kind: ActionKind::DetectCollision { targets },
        }
    }

    pub fn custom(
        name: impl Into<String>,
        tau_start: f64,
        tau_end: f64,
        behavior: Arc<dyn ActionBehavior>,
    ) -> Self {
        Self {
            tau_start,
            tau_end,
            cause: Cause { name: name.into(), silent: false, kind: CauseKind::Custom },
            kind: ActionKind::Custom(behavior),
        }
    }

    pub(crate) fn finish(target: ActionRef, name: String, tau: f64) -> Self {
        Self {
            tau_start: tau,
            tau_end: tau,
            cause: Cause { name, silent: true, kind: CauseKind::Finish },
            kind: ActionKind::Finish { target },
        }
    }

    /// Builder toggle: suppress the start/end edge events for this action.
    pub fn silent(mut self) -> Self {
        self.cause.silent = true;
        self
    }

    pub(crate) fn init_state(&self) -> ActionState {
        match &self.kind {
            ActionKind::Pulse => ActionState::Pulse(PulseState::default()),
            ActionKind::DetectCollision { .. } => {
                ActionState::Collision(CollisionState::default())
            }
            ActionKind::Custom(behavior) => behavior.init(),
            _ => ActionState::None,
        }
    }

    /// Execute one firing of this action against the candidate world.
    pub(crate) fn act(
        &self,
        view: &mut DeltaWorld<'_>,
        owner: &ObjName,
        tau: f64,
        state: ActionState,
    ) -> Result<ActionState, ActError> {
        match &self.kind {
            ActionKind::Marker => Ok(ActionState::None),
            ActionKind::Sender { start, period, index } => {
                behaviors::send_pulse(view, &self.cause.name, owner, *start, *period, *index)
            }
            ActionKind::Pulse => behaviors::propagate_pulse(view, &self.cause, owner, state),
            ActionKind::DetectCollision { targets } => {
                behaviors::detect_collisions(view, &self.cause, owner, targets, state)
            }
            ActionKind::Finish { target } => behaviors::finish_action(view, owner, target),
            ActionKind::Custom(behavior) => behavior.act(view, owner, tau, state),
        }
    }
}

// ============================================================================
// Behavior interface and opaque state
// ============================================================================

/// Behavior of a user-defined action. The engine threads the returned state
/// token back into the next firing without inspecting it.
pub trait ActionBehavior: fmt::Debug + Send + Sync {
    fn init(&self) -> ActionState {
        ActionState::None
    }

    fn act(
        &self,
        view: &mut DeltaWorld<'_>,
        owner: &ObjName,
        tau: f64,
        state: ActionState,
    ) -> Result<ActionState, ActError>;
}

/// Opaque per-action state.
#[derive(Clone, Default)]
pub enum ActionState {
    #[default]
    None,
    Pulse(PulseState),
    Collision(CollisionState),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionState::None => write!(f, "None"),
            ActionState::Pulse(state) => f.debug_tuple("Pulse").field(state).finish(),
            ActionState::Collision(state) => f.debug_tuple("Collision").field(state).finish(),
            ActionState::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Wavefront bookkeeping for a pulse.
#[derive(Debug, Clone, Default)]
pub struct PulseState {
    /// Source event, captured in the world frame at the first firing.
    pub source: Option<State>,
    /// Objects that can no longer receive this pulse.
    pub impossible: BTreeSet<ObjName>,
    /// Objects still ahead of the wavefront.
    pub tracked: BTreeSet<ObjName>,
}

/// Hysteresis set for a collision detector.
#[derive(Debug, Clone, Default)]
pub struct CollisionState {
    /// Targets currently recorded as collided.
    pub generated: BTreeSet<ObjName>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ActError {
    /// The scheduler stepped past an event this action needs to localize.
    /// Recovered internally by time-interval bisection; never surfaced.
    #[error("retry with a smaller time step")]
    RetrySmallerStep { hint: Option<f64> },
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}
