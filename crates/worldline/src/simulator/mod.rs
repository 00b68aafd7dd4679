//! Worldline simulator - relativistic objects, scheduled actions, and the
//! coordinate-time scheduler.
//!
//! This module is organized into submodules:
//! - `types`: ids, constants, and simulator configuration
//! - `frame`: coordinate frames and state transforms
//! - `motion`: worldline segments (inertial, abrupt change, acceleration)
//! - `object`: object identity, motion map, action schedule
//! - `action`: action records, causes, behaviors, opaque action state
//! - `behaviors`: the built-in pulse / sender / collision behaviors
//! - `world`: committed world state and the event log
//! - `event`: event records and query filters
//! - `delta`: the candidate (write-buffered) world used inside a step
//! - `propagation`: advancing an object to a proper or coordinate time
//! - `kernel`: the `simulate_to` scheduler loop and observers
//! - `scenario`: canned scenario presets

mod action;
mod behaviors;
mod delta;
mod event;
mod frame;
mod kernel;
mod motion;
mod object;
mod propagation;
mod scenario;
mod types;
mod world;


pub use action::{
    ActError, Action, ActionBehavior, ActionKind, ActionState, Cause, CauseKind, CollisionState,
    PulseState,
};
pub use delta::DeltaWorld;
pub use event::{Event, EventFilter};
pub use frame::{transform, Frame};
pub use kernel::{Observer, ObserverFlow, Simulator};
pub use motion::Motion;
pub use object::{ActionRef, ModelError, Obj, ScheduleKey};
pub use scenario::WorldScenario;
pub use types::{ObjName, ObserverId, SimConfig, TauKey, DEFAULT_EPS, DEFAULT_MAX_RETRIES};
pub use world::{SimulationError, World, WorldView};
