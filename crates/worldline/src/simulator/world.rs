//! Committed world state: objects, space, action bookkeeping, event log.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use worldline_math::{KinematicsError, State};

use super::action::{Action, ActionState};
use super::delta::ChangeSet;
use super::event::{Event, EventFilter};
use super::frame::Frame;
use super::object::{ActionRef, ModelError, Obj};
use super::types::{ObjName, SimConfig};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
    #[error("no object named {0}")]
    UnknownObject(ObjName),
    #[error("object {0} already exists")]
    DuplicateObject(ObjName),
    #[error("object {obj} introduced at t={t}, before the current time {now}")]
    PastObjectIntroduction { obj: ObjName, t: f64, now: f64 },
    #[error("schedule entry at tau {tau} on {obj}, before its current proper time {now_tau}")]
    PastScheduling { obj: ObjName, tau: f64, now_tau: f64 },
    #[error("object {obj} must enter at the current time {now}, got t={t}")]
    IntroductionTimeMismatch { obj: ObjName, t: f64, now: f64 },
    #[error("time step at t={t} still unresolved after {retries} bisection retries")]
    ExcessiveRetries { t: f64, retries: u32 },
}

// ============================================================================
// Read capability
// ============================================================================

/// The read capability an action callback (and any caller holding a world
/// reference) sees.
pub trait WorldView {
    fn now(&self) -> f64;

    fn origin(&self) -> Frame {
        Frame::ORIGIN
    }

    /// Object names in deterministic (insertion) order.
    fn object_names(&self) -> Vec<ObjName>;

    /// World-frame state of an object at the current time.
    fn state_of(&self, obj: &str) -> Result<State, SimulationError>;

    fn state_in_frame(&self, obj: &str, frame: &Frame) -> Result<State, SimulationError> {
        let s = self.state_of(obj)?;
        Ok(frame.from_origin(&s)?)
    }

    fn events(&self) -> Vec<&Event>;

    fn action_state(&self, action: &ActionRef) -> Option<ActionState>;

    fn find_action(&self, action: &ActionRef) -> Option<Action>;

    fn is_active(&self, action: &ActionRef) -> bool;

    fn is_complete(&self, action: &ActionRef) -> bool;

    fn log_actions(&self) -> bool;

    fn eps(&self) -> f64;
}

// ============================================================================
// World
// ============================================================================

#[derive(Debug, Default)]
pub struct World {
    config: SimConfig,
    now: f64,
    order: Vec<ObjName>,
    objects: BTreeMap<ObjName, Obj>,
    space: BTreeMap<ObjName, State>,
    active: BTreeSet<ActionRef>,
    complete: BTreeSet<ActionRef>,
    action_states: BTreeMap<ActionRef, ActionState>,
    events: Vec<Event>,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        Self { config: config.sanitized(), ..Self::default() }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Object names in insertion order.
    pub fn object_order(&self) -> &[ObjName] {
        &self.order
    }

    pub fn obj(&self, name: &str) -> Option<&Obj> {
        self.objects.get(name)
    }

    pub fn event_log(&self) -> &[Event] {
        &self.events
    }

    pub fn find_events(&self, filter: &EventFilter) -> Vec<&Event> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn active_actions(&self) -> &BTreeSet<ActionRef> {
        &self.active
    }

    pub fn complete_actions(&self) -> &BTreeSet<ActionRef> {
        &self.complete
    }

    /// Add an object at the current time. The state's time component must
    /// already sit on `now`; it is snapped exactly.
    pub fn add_object(&mut self, obj: Obj, mut state: State) -> Result<(), SimulationError> {
        let name = obj.name().to_string();
        if self.objects.contains_key(&name) {
            return Err(SimulationError::DuplicateObject(name));
        }
        if (state.r.t - self.now).abs() > self.config.eps {
            return Err(SimulationError::IntroductionTimeMismatch {
                obj: name,
                t: state.r.t,
                now: self.now,
            });
        }
        state.r.t = self.now;
        self.order.push(name.clone());
        self.objects.insert(name.clone(), obj);
        self.space.insert(name, state);
        Ok(())
    }

    pub(crate) fn mark_active(&mut self, action: &ActionRef) {
        self.active.insert(action.clone());
    }

    pub(crate) fn mark_complete(&mut self, action: &ActionRef) {
        self.active.remove(action);
        self.complete.insert(action.clone());
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Schedule the synthetic end edge for a windowed action.
    pub(crate) fn append_finisher(
        &mut self,
        target: &ActionRef,
        tau_end: f64,
    ) -> Result<ActionRef, SimulationError> {
        let name = self
            .find_action(target)
            .map(|a| a.cause.name)
            .unwrap_or_default();
        let obj = self
            .objects
            .get_mut(&target.obj)
            .ok_or_else(|| SimulationError::UnknownObject(target.obj.clone()))?;
        Ok(obj.add_action(Action::finish(target.clone(), name, tau_end))?)
    }

    pub(crate) fn commit(&mut self, changes: ChangeSet) -> Result<(), SimulationError> {
        self.now = changes.now;
        self.space = changes.space;
        for (obj, state) in changes.introductions {
            let name = obj.name().to_string();
            if self.objects.contains_key(&name) {
                return Err(SimulationError::DuplicateObject(name));
            }
            self.order.push(name.clone());
            self.objects.insert(name.clone(), obj);
            self.space.insert(name, state);
        }
        for (name, state) in changes.repositions {
            self.space.insert(name, state);
        }
        for (name, motion) in changes.motions {
            self.objects
                .get_mut(&name)
                .ok_or(SimulationError::UnknownObject(name.clone()))?
                .add_motion(motion)?;
        }
        for (action_ref, action) in changes.actions {
            let obj = self
                .objects
                .get_mut(&action_ref.obj)
                .ok_or_else(|| SimulationError::UnknownObject(action_ref.obj.clone()))?;
            let assigned = obj.add_action(action)?;
            debug_assert_eq!(assigned, action_ref);
        }
        for (action, state) in changes.action_states {
            self.action_states.insert(action, state);
        }
        for action in changes.completions {
            self.active.remove(&action);
            self.complete.insert(action);
        }
        for action in changes.deactivations {
            self.active.remove(&action);
        }
        self.events.extend(changes.events);
        Ok(())
    }
}

impl WorldView for World {
    fn now(&self) -> f64 {
        self.now
    }

    fn object_names(&self) -> Vec<ObjName> {
        self.order.clone()
    }

    fn state_of(&self, obj: &str) -> Result<State, SimulationError> {
        self.space
            .get(obj)
            .copied()
            .ok_or_else(|| SimulationError::UnknownObject(obj.to_string()))
    }

    fn events(&self) -> Vec<&Event> {
        self.events.iter().collect()
    }

    fn action_state(&self, action: &ActionRef) -> Option<ActionState> {
        self.action_states.get(action).cloned()
    }

    fn find_action(&self, action: &ActionRef) -> Option<Action> {
        self.objects
            .get(&action.obj)
            .and_then(|obj| obj.action(action.seq))
            .cloned()
    }

    fn is_active(&self, action: &ActionRef) -> bool {
        self.active.contains(action)
    }

    fn is_complete(&self, action: &ActionRef) -> bool {
        self.complete.contains(action)
    }

    fn log_actions(&self) -> bool {
        self.config.log_actions
    }

    fn eps(&self) -> f64 {
        self.config.eps
    }
}
