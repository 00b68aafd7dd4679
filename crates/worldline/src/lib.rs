pub mod simulator;

pub use simulator::{
    transform, ActError, Action, ActionBehavior, ActionKind, ActionRef, ActionState, Cause,
    CauseKind, CollisionState, DeltaWorld, Event, EventFilter, Frame, ModelError, Motion, Obj,
    ObjName, Observer, ObserverFlow, ObserverId, PulseState, ScheduleKey, SimConfig,
    SimulationError, Simulator, TauKey, World, WorldScenario, WorldView, DEFAULT_EPS,
    DEFAULT_MAX_RETRIES,
};

pub use worldline_math::{
    gamma, separation, KinematicsError, Separation, State, Vector3, Vector4,
};
