//! The simulation kernel: earliest-action selection, the transactional inner
//! loop with adaptive bisection, and observers.

use std::collections::BTreeMap;
use tracing::{debug, warn};
use worldline_math::{State, Vector3, Vector4};

use super::action::{ActError, Action};
use super::delta::DeltaWorld;
use super::event::{Event, EventFilter};
use super::object::{ActionRef, Obj};
use super::propagation::{advance_to_coordinate_time, advance_to_proper_time};
use super::types::{ObjName, ObserverId, SimConfig};
use super::world::{SimulationError, World, WorldView};

// ============================================================================
// Observers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverFlow {
    Continue,
    Stop,
}

/// Invoked with a read-only view after every committed time step; returning
/// [`ObserverFlow::Stop`] ends `simulate_to` early.
pub trait Observer {
    fn on_step(&mut self, world: &World) -> ObserverFlow;
}

impl<F: FnMut(&World) -> ObserverFlow> Observer for F {
    fn on_step(&mut self, world: &World) -> ObserverFlow {
        self(world)
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// The earliest pending action across all objects, with the owner's
/// world-frame state at its firing instant.
struct Earliest {
    action: ActionRef,
    record: Action,
    state: State,
}

enum FireError {
    Retry(Option<f64>),
    Fatal(SimulationError),
}

pub struct Simulator {
    world: World,
    observers: BTreeMap<ObserverId, Box<dyn Observer>>,
    next_observer: ObserverId,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            world: World::new(config),
            observers: BTreeMap::new(),
            next_observer: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn events(&self) -> &[Event] {
        self.world.event_log()
    }

    pub fn find_events(&self, filter: &EventFilter) -> Vec<&Event> {
        self.world.find_events(filter)
    }

    /// Add an object at the current world time with the given 4-position,
    /// velocity, and proper time.
    pub fn add_object(
        &mut self,
        obj: Obj,
        r: Vector4,
        v: Vector3,
        tau: f64,
    ) -> Result<(), SimulationError> {
        self.world.add_object(obj, State::new(r, v, tau))
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.insert(id, observer);
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    /// Advance the world to coordinate time `t_horizon`, firing actions in
    /// non-decreasing world-frame time order.
    pub fn simulate_to(&mut self, t_horizon: f64) -> Result<(), SimulationError> {
        let eps = self.world.config().eps;
        let max_retries = self.world.config().max_retries;

        while self.world.now() < t_horizon {
            let earliest = match self.earliest_pending()? {
                Some(e) if e.state.r.t > t_horizon => None,
                other => other,
            };

            // Fast path: nothing to fire in the window.
            if earliest.is_none() && self.world.active_actions().is_empty() {
                let space = self.candidate_space(t_horizon, None)?;
                let changes = DeltaWorld::new(&self.world, t_horizon, space).into_changes();
                self.world.commit(changes)?;
                self.notify_observers();
                break;
            }

            let mut target = earliest.as_ref().map(|e| e.state.r.t).unwrap_or(t_horizon);
            let mut fallback = self.world.now();
            let mut evaluated = target;
            let mut retries: u32 = 0;
            let mut fired_at_own_time = false;

            loop {
                let fires_earliest =
                    earliest.as_ref().is_some_and(|e| e.state.r.t == evaluated);
                let space = self.candidate_space(evaluated, earliest.as_ref())?;
                let mut delta = DeltaWorld::new(&self.world, evaluated, space);
                let outcome = self.fire_all(
                    &mut delta,
                    earliest.as_ref().filter(|_| fires_earliest),
                    false,
                );
                match outcome {
                    Err(FireError::Fatal(e)) => return Err(e),
                    Err(FireError::Retry(hint)) => {
                        retries += 1;
                        if retries > max_retries {
                            return Err(SimulationError::ExcessiveRetries {
                                t: evaluated,
                                retries,
                            });
                        }
                        let span = evaluated - fallback;
                        if span.abs() < eps {
                            warn!(
                                t = evaluated,
                                span, "bisection precision exhausted; committing as-is"
                            );
                            let space = self.candidate_space(evaluated, earliest.as_ref())?;
                            let mut delta = DeltaWorld::new(&self.world, evaluated, space);
                            if let Err(FireError::Fatal(e)) = self.fire_all(
                                &mut delta,
                                earliest.as_ref().filter(|_| fires_earliest),
                                true,
                            ) {
                                return Err(e);
                            }
                            fired_at_own_time = fires_earliest;
                            let changes = delta.into_changes();
                            self.world.commit(changes)?;
                            if evaluated < target {
                                fallback = evaluated;
                                evaluated = target;
                                continue;
                            }
                            break;
                        }
                        debug!(from = evaluated, "action requested a smaller step");
                        target = evaluated;
                        evaluated = match hint {
                            Some(h) if h > fallback && h < evaluated => {
                                h.clamp(fallback + 0.1 * span, evaluated - 0.1 * span)
                            }
                            _ => 0.5 * (fallback + evaluated),
                        };
                    }
                    Ok(()) => {
                        fired_at_own_time = fires_earliest;
                        let changes = delta.into_changes();
                        self.world.commit(changes)?;
                        if evaluated < target {
                            fallback = evaluated;
                            evaluated = target;
                            continue;
                        }
                        break;
                    }
                }
            }

            if let Some(e) = earliest.as_ref() {
                if fired_at_own_time {
                    self.settle_fired_action(e)?;
                }
            }

            if self.notify_observers() == ObserverFlow::Stop {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Post-commit bookkeeping for an action fired at its own instant: point
    /// actions complete, windowed actions become active and get an end edge,
    /// and loud actions log their start event.
    fn settle_fired_action(&mut self, earliest: &Earliest) -> Result<(), SimulationError> {
        let record = &earliest.record;
        if record.tau_start == record.tau_end {
            self.world.mark_complete(&earliest.action);
        } else {
            self.world.mark_active(&earliest.action);
            if record.tau_end.is_finite() {
                self.world.append_finisher(&earliest.action, record.tau_end)?;
            }
        }
        if self.world.config().log_actions && !record.cause.silent {
            let state = self.world.state_of(&earliest.action.obj)?;
            self.world.push_event(Event {
                name: record.cause.name.clone(),
                cause: record.cause.clone(),
                sender: earliest.action.obj.clone(),
                sender_state: state,
                receiver: earliest.action.obj.clone(),
                receiver_state: state,
            });
        }
        Ok(())
    }

    /// For every object, the first schedule entry that is neither complete
    /// nor active, advanced to its firing instant; the overall earliest by
    /// world-frame time wins, first-inserted object on ties.
    fn earliest_pending(&self) -> Result<Option<Earliest>, SimulationError> {
        let eps = self.world.config().eps;
        let mut best: Option<Earliest> = None;
        for name in self.world.object_order() {
            let obj = self
                .world
                .obj(name)
                .ok_or_else(|| SimulationError::UnknownObject(name.clone()))?;
            let pending = obj.schedule().find(|(action_ref, _)| {
                !self.world.is_complete(action_ref) && !self.world.is_active(action_ref)
            });
            let Some((action_ref, action)) = pending else { continue };
            let state = self.world.state_of(name)?;
            let fire_state = advance_to_proper_time(obj, &state, action.tau_start, eps)?;
            if best
                .as_ref()
                .map(|b| fire_state.r.t < b.state.r.t)
                .unwrap_or(true)
            {
                best = Some(Earliest {
                    action: action_ref,
                    record: action.clone(),
                    state: fire_state,
                });
            }
        }
        Ok(best)
    }

    /// Candidate positions of every object at `evaluated`. The earliest
    /// action's owner reuses its pre-computed firing state when the times
    /// coincide exactly.
    fn candidate_space(
        &self,
        evaluated: f64,
        earliest: Option<&Earliest>,
    ) -> Result<BTreeMap<ObjName, State>, SimulationError> {
        let eps = self.world.config().eps;
        let mut space = BTreeMap::new();
        for name in self.world.object_order() {
            let precomputed = earliest
                .filter(|e| e.action.obj == *name && e.state.r.t == evaluated)
                .map(|e| e.state);
            let state = match precomputed {
                Some(state) => state,
                None => {
                    let obj = self
                        .world
                        .obj(name)
                        .ok_or_else(|| SimulationError::UnknownObject(name.clone()))?;
                    advance_to_coordinate_time(obj, &self.world.state_of(name)?, evaluated, eps)?
                }
            };
            space.insert(name.clone(), state);
        }
        Ok(space)
    }

    /// Invoke every live action against the candidate world: active actions
    /// first in stable schedule order, then the earliest action. With `force`
    /// set, retry requests are ignored and the action keeps its previous
    /// state.
    fn fire_all(
        &self,
        delta: &mut DeltaWorld<'_>,
        earliest: Option<&Earliest>,
        force: bool,
    ) -> Result<(), FireError> {
        let mut live: Vec<(ActionRef, Action)> = self
            .world
            .active_actions()
            .iter()
            .filter_map(|r| self.world.find_action(r).map(|a| (r.clone(), a)))
            .collect();
        live.sort_by(|(ra, a), (rb, b)| {
            a.tau_start
                .total_cmp(&b.tau_start)
                .then(a.tau_end.total_cmp(&b.tau_end))
                .then(a.cause.name.cmp(&b.cause.name))
                .then(ra.cmp(rb))
        });
        if let Some(e) = earliest {
            live.push((e.action.clone(), e.record.clone()));
        }

        for (action_ref, action) in live {
            let state = delta
                .action_state(&action_ref)
                .unwrap_or_else(|| action.init_state());
            let tau = delta
                .state_of(&action_ref.obj)
                .map_err(FireError::Fatal)?
                .tau;
            match action.act(delta, &action_ref.obj, tau, state) {
                Ok(next) => delta.set_action_state(action_ref, next),
                Err(ActError::RetrySmallerStep { hint }) => {
                    if !force {
                        return Err(FireError::Retry(hint));
                    }
                }
                Err(ActError::Simulation(e)) => return Err(FireError::Fatal(e)),
            }
        }
        Ok(())
    }

    fn notify_observers(&mut self) -> ObserverFlow {
        let mut flow = ObserverFlow::Continue;
        for observer in self.observers.values_mut() {
            if observer.on_step(&self.world) == ObserverFlow::Stop {
                flow = ObserverFlow::Stop;
            }
        }
        flow
    }
}
