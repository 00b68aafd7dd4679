//! The candidate world: a write-buffered overlay over the committed world,
//! used for exactly one evaluated instant. Discarded wholesale on retry,
//! applied atomically on commit.

use std::collections::{BTreeMap, BTreeSet};
use worldline_math::{State, Vector3, Vector4};

use super::action::{Action, ActionState};
use super::event::Event;
use super::motion::Motion;
use super::object::{ActionRef, ModelError, Obj};
use super::types::ObjName;
use super::world::{SimulationError, World, WorldView};

/// Buffered changes, folded into the world on commit.
#[derive(Debug, Default)]
pub(crate) struct ChangeSet {
    pub now: f64,
    pub space: BTreeMap<ObjName, State>,
    pub events: Vec<Event>,
    pub introductions: Vec<(Obj, State)>,
    pub repositions: Vec<(ObjName, State)>,
    pub motions: Vec<(ObjName, Motion)>,
    pub actions: Vec<(ActionRef, Action)>,
    pub action_states: BTreeMap<ActionRef, ActionState>,
    pub completions: BTreeSet<ActionRef>,
    pub deactivations: BTreeSet<ActionRef>,
}

pub struct DeltaWorld<'w> {
    base: &'w World,
    changes: ChangeSet,
}

impl<'w> DeltaWorld<'w> {
    pub(crate) fn new(base: &'w World, now: f64, space: BTreeMap<ObjName, State>) -> Self {
        Self {
            base,
            changes: ChangeSet { now, space, ..ChangeSet::default() },
        }
    }

    pub(crate) fn into_changes(self) -> ChangeSet {
        self.changes
    }

    fn exists(&self, name: &str) -> bool {
        self.base.obj(name).is_some()
            || self.changes.introductions.iter().any(|(o, _)| o.name() == name)
    }

    /// Sequence number the owning object will hand out for the next buffered
    /// action, accounting for actions already buffered this step.
    fn next_seq(&self, owner: &str) -> Result<u64, SimulationError> {
        let base = self
            .base
            .obj(owner)
            .map(Obj::next_seq)
            .ok_or_else(|| SimulationError::UnknownObject(owner.to_string()))?;
        let buffered = self
            .changes
            .actions
            .iter()
            .filter(|(r, _)| r.obj == owner)
            .count() as u64;
        Ok(base + buffered)
    }

    // ------------------------------------------------------------------------
    // Buffered writes
    // ------------------------------------------------------------------------

    pub fn add_event(&mut self, event: Event) {
        self.changes.events.push(event);
    }

    /// Schedule an action on `owner`, in the owner's proper-time future.
    pub fn add_action(
        &mut self,
        owner: &str,
        action: Action,
    ) -> Result<ActionRef, SimulationError> {
        let now_tau = self.state_of(owner)?.tau;
        if action.tau_end < action.tau_start {
            return Err(ModelError::InvalidAction {
                obj: owner.to_string(),
                name: action.cause.name.clone(),
                tau_start: action.tau_start,
                tau_end: action.tau_end,
            }
            .into());
        }
        if action.tau_start < now_tau - self.eps() {
            return Err(SimulationError::PastScheduling {
                obj: owner.to_string(),
                tau: action.tau_start,
                now_tau,
            });
        }
        if let Some((obj, _)) = self
            .changes
            .introductions
            .iter_mut()
            .find(|(o, _)| o.name() == owner)
        {
            return Ok(obj.add_action(action)?);
        }
        let seq = self.next_seq(owner)?;
        let action_ref = ActionRef { obj: owner.to_string(), seq };
        self.changes.actions.push((action_ref.clone(), action));
        Ok(action_ref)
    }

    /// Append a motion to `owner`, in the owner's proper-time future and not
    /// overlapping any existing or buffered segment.
    pub fn add_motion(&mut self, owner: &str, motion: Motion) -> Result<(), SimulationError> {
        let now_tau = self.state_of(owner)?.tau;
        if motion.tau_start() < now_tau - self.eps() {
            return Err(SimulationError::PastScheduling {
                obj: owner.to_string(),
                tau: motion.tau_start(),
                now_tau,
            });
        }
        if let Some((obj, _)) = self
            .changes
            .introductions
            .iter_mut()
            .find(|(o, _)| o.name() == owner)
        {
            return Ok(obj.add_motion(motion)?);
        }
        let (start, end) = (motion.tau_start(), motion.tau_end());
        let base_obj = self
            .base
            .obj(owner)
            .ok_or_else(|| SimulationError::UnknownObject(owner.to_string()))?;
        let buffered = self
            .changes
            .motions
            .iter()
            .filter(|(name, _)| name == owner)
            .map(|(_, m)| m);
        for existing in base_obj.motions().chain(buffered) {
            let (s, e) = (existing.tau_start(), existing.tau_end());
            if (s < end && start < e) || s == start {
                return Err(ModelError::InvalidMotion {
                    obj: owner.to_string(),
                    tau_start: start,
                }
                .into());
            }
        }
        self.changes.motions.push((owner.to_string(), motion));
        Ok(())
    }

    /// Introduce an object, or reposition an existing one.
    ///
    /// A state strictly before `now` is an error. A state strictly after
    /// `now` is rewritten so the object never appears outside an observer's
    /// lightcone: it enters now, at rest, at the spatial projection, with its
    /// proper time offset back by the time difference, plus a silent velocity
    /// change at the target proper time and an `"Appear"` marker.
    pub fn add_or_set_object(&mut self, obj: Obj, state: State) -> Result<(), SimulationError> {
        let eps = self.eps();
        let now = self.changes.now;
        let name = obj.name().to_string();
        if state.r.t < now - eps {
            return Err(SimulationError::PastObjectIntroduction {
                obj: name,
                t: state.r.t,
                now,
            });
        }
        if state.r.t > now + eps {
            let offset = state.r.t - now;
            let entry = State::new(
                Vector4::from_parts(now, state.r.spatial()),
                Vector3::ZERO,
                state.tau - offset,
            );
            let jump = Motion::AbruptVelocityChange { tau_start: state.tau, v: state.v };
            let appear = Action::marker("Appear", state.tau);
            if self.exists(&name) {
                self.changes.space.insert(name.clone(), entry);
                self.changes.repositions.push((name.clone(), entry));
                self.add_motion(&name, jump)?;
                self.add_action(&name, appear)?;
            } else {
                let mut obj = obj;
                obj.add_motion(jump)?;
                obj.add_action(appear)?;
                self.changes.space.insert(name, entry);
                self.changes.introductions.push((obj, entry));
            }
            return Ok(());
        }
        let entry = State::new(Vector4::from_parts(now, state.r.spatial()), state.v, state.tau);
        if self.exists(&name) {
            self.changes.space.insert(name.clone(), entry);
            self.changes.repositions.push((name, entry));
        } else {
            self.changes.space.insert(name, entry);
            self.changes.introductions.push((obj, entry));
        }
        Ok(())
    }

    pub fn set_action_state(&mut self, action: ActionRef, state: ActionState) {
        self.changes.action_states.insert(action, state);
    }

    /// Mark an action's end edge as fired.
    pub fn complete(&mut self, action: ActionRef) {
        self.changes.deactivations.remove(&action);
        self.changes.completions.insert(action);
    }

    /// Drop an action from the active set without completing it.
    pub fn deactivate(&mut self, action: ActionRef) {
        self.changes.deactivations.insert(action);
    }
}

impl WorldView for DeltaWorld<'_> {
    fn now(&self) -> f64 {
        self.changes.now
    }

    fn object_names(&self) -> Vec<ObjName> {
        let mut names = self.base.object_order().to_vec();
        names.extend(
            self.changes
                .introductions
                .iter()
                .map(|(o, _)| o.name().to_string()),
        );
        names
    }

    fn state_of(&self, obj: &str) -> Result<State, SimulationError> {
        self.changes
            .space
            .get(obj)
            .copied()
            .ok_or_else(|| SimulationError::UnknownObject(obj.to_string()))
    }

    fn events(&self) -> Vec<&Event> {
        self.base
            .event_log()
            .iter()
            .chain(self.changes.events.iter())
            .collect()
    }

    fn action_state(&self, action: &ActionRef) -> Option<ActionState> {
        self.changes
            .action_states
            .get(action)
            .cloned()
            .or_else(|| self.base.action_state(action))
    }

    fn find_action(&self, action: &ActionRef) -> Option<Action> {
        if let Some(found) = self.base.find_action(action) {
            return Some(found);
        }
        if let Some((_, found)) = self.changes.actions.iter().find(|(r, _)| r == action) {
            return Some(found.clone());
        }
        self.changes
            .introductions
            .iter()
            .find(|(o, _)| o.name() == action.obj)
            .and_then(|(o, _)| o.action(action.seq))
            .cloned()
    }

    fn is_active(&self, action: &ActionRef) -> bool {
        if self.changes.completions.contains(action) || self.changes.deactivations.contains(action)
        {
            return false;
        }
        self.base.is_active(action)
    }

    fn is_complete(&self, action: &ActionRef) -> bool {
        self.changes.completions.contains(action) || self.base.is_complete(action)
    }

    fn log_actions(&self) -> bool {
        self.base.log_actions()
    }

    fn eps(&self) -> f64 {
        self.base.eps()
    }
}
