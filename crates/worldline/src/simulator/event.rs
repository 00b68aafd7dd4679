//! Event records and query filters.

use regex::Regex;
use serde::{Deserialize, Serialize};
use worldline_math::{State, Vector3};

use super::action::{Cause, CauseKind};
use super::types::{ObjName, DEFAULT_EPS};

/// A causal event in the log. Both states are captured at the commit instant,
/// so `receiver_state.r` is the event's world-frame 4-position (the reception
/// point for pulses, the contact point for collisions, the owner for
/// markers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub cause: Cause,
    pub sender: ObjName,
    pub sender_state: State,
    pub receiver: ObjName,
    pub receiver_state: State,
}

impl Event {
    pub fn position(&self) -> worldline_math::Vector4 {
        self.receiver_state.r
    }
}

/// Conjunction of optional event predicates; an unset field matches
/// everything. Times, places, and proper times match within `tolerance`.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub name: Option<String>,
    pub name_pattern: Option<Regex>,
    pub time: Option<f64>,
    pub place: Option<Vector3>,
    pub sender: Option<ObjName>,
    pub receiver: Option<ObjName>,
    pub cause_kind: Option<CauseKind>,
    pub proper_time: Option<f64>,
    pub tolerance: f64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            name: None,
            name_pattern: None,
            time: None,
            place: None,
            sender: None,
            receiver: None,
            cause_kind: None,
            proper_time: None,
            tolerance: DEFAULT_EPS,
        }
    }
}

impl EventFilter {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn matching(pattern: Regex) -> Self {
        Self { name_pattern: Some(pattern), ..Self::default() }
    }

    pub fn received_by(receiver: impl Into<String>) -> Self {
        Self { receiver: Some(receiver.into()), ..Self::default() }
    }

    pub fn sent_by(sender: impl Into<String>) -> Self {
        Self { sender: Some(sender.into()), ..Self::default() }
    }

    pub fn caused_by(kind: CauseKind) -> Self {
        Self { cause_kind: Some(kind), ..Self::default() }
    }

    pub fn at_time(time: f64, tolerance: f64) -> Self {
        Self { time: Some(time), tolerance, ..Self::default() }
    }

    pub fn at_place(place: Vector3, tolerance: f64) -> Self {
        Self { place: Some(place), tolerance, ..Self::default() }
    }

    pub fn at_proper_time(tau: f64, tolerance: f64) -> Self {
        Self { proper_time: Some(tau), tolerance, ..Self::default() }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(name) = &self.name {
            if event.name != *name {
                return false;
            }
        }
        if let Some(pattern) = &self.name_pattern {
            if !pattern.is_match(&event.name) {
                return false;
            }
        }
        if let Some(time) = self.time {
            if (event.position().t - time).abs() > self.tolerance {
                return false;
            }
        }
        if let Some(place) = self.place {
            if (event.position().spatial() - place).norm() > self.tolerance {
                return false;
            }
        }
        if let Some(sender) = &self.sender {
            if event.sender != *sender {
                return false;
            }
        }
        if let Some(receiver) = &self.receiver {
            if event.receiver != *receiver {
                return false;
            }
        }
        if let Some(kind) = self.cause_kind {
            if event.cause.kind != kind {
                return false;
            }
        }
        if let Some(tau) = self.proper_time {
            if (event.receiver_state.tau - tau).abs() > self.tolerance {
                return false;
            }
        }
        true
    }
}
