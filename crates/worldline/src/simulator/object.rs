//! Objects: stable identity, an ordered motion map, and an ordered action
//! schedule.

use std::collections::BTreeMap;
use thiserror::Error;

use super::action::Action;
use super::motion::Motion;
use super::types::{ObjName, TauKey};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("motion starting at tau {tau_start} overlaps an existing segment on {obj}")]
    InvalidMotion { obj: ObjName, tau_start: f64 },
    #[error("action {name} on {obj} ends at tau {tau_end}, before its start {tau_start}")]
    InvalidAction {
        obj: ObjName,
        name: String,
        tau_start: f64,
        tau_end: f64,
    },
}

/// Stable identity of a scheduled action: owning object plus a per-object
/// sequence number assigned at insertion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionRef {
    pub obj: ObjName,
    pub seq: u64,
}

/// Schedule ordering: `(tau_start, tau_end, name)`, with the insertion
/// sequence as a stable tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduleKey {
    pub tau_start: TauKey,
    pub tau_end: TauKey,
    pub name: String,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct Obj {
    name: ObjName,
    motions: BTreeMap<TauKey, Motion>,
    actions: BTreeMap<ScheduleKey, Action>,
    index: BTreeMap<u64, ScheduleKey>,
    next_seq: u64,
}

impl Obj {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            motions: BTreeMap::new(),
            actions: BTreeMap::new(),
            index: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a motion. Motions may not overlap in proper time; segment
    /// boundaries may touch (half-open intervals).
    pub fn add_motion(&mut self, motion: Motion) -> Result<(), ModelError> {
        let start = motion.tau_start();
        let end = motion.tau_end();
        let invalid = ModelError::InvalidMotion {
            obj: self.name.clone(),
            tau_start: start,
        };
        if end < start || self.motions.contains_key(&TauKey(start)) {
            return Err(invalid);
        }
        for existing in self.motions.values() {
            let (s, e) = (existing.tau_start(), existing.tau_end());
            // Half-open overlap; also catches point motions strictly inside
            // an open segment interval.
            if s < end && start < e {
                return Err(invalid);
            }
        }
        self.motions.insert(TauKey(start), motion);
        Ok(())
    }

    /// Insert an action into the schedule; requires `tau_end >= tau_start`.
    pub fn add_action(&mut self, action: Action) -> Result<ActionRef, ModelError> {
        if action.tau_end < action.tau_start {
            return Err(ModelError::InvalidAction {
                obj: self.name.clone(),
                name: action.cause.name.clone(),
                tau_start: action.tau_start,
                tau_end: action.tau_end,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let key = ScheduleKey {
            tau_start: TauKey(action.tau_start),
            tau_end: TauKey(action.tau_end),
            name: action.cause.name.clone(),
            seq,
        };
        self.index.insert(seq, key.clone());
        self.actions.insert(key, action);
        Ok(ActionRef { obj: self.name.clone(), seq })
    }

    pub fn motions(&self) -> impl Iterator<Item = &Motion> {
        self.motions.values()
    }

    /// Actions in schedule order, with their stable references.
    pub fn schedule(&self) -> impl Iterator<Item = (ActionRef, &Action)> {
        let name = self.name.clone();
        self.actions.iter().map(move |(key, action)| {
            (ActionRef { obj: name.clone(), seq: key.seq }, action)
        })
    }

    pub fn action(&self, seq: u64) -> Option<&Action> {
        self.index.get(&seq).and_then(|key| self.actions.get(key))
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }
}
