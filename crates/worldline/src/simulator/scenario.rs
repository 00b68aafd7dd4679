//! Canned scenario presets (stable IDs).

use worldline_math::{Vector3, Vector4};

use super::action::Action;
use super::kernel::Simulator;
use super::motion::Motion;
use super::object::Obj;
use super::world::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldScenario {
    /// A resting sender and a resting receiver one light-unit apart,
    /// exchanging a single pulse.
    PulseExchange,
    /// One twin stays home; the other flies a four-burn out-and-back profile
    /// at unit proper acceleration with a collision detector armed for the
    /// reunion.
    TwinParadox,
    /// Two rockets with equal proper acceleration, the rear one clocking the
    /// front with a once-per-proper-unit pulse train.
    RocketClocks,
}

impl WorldScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldScenario::PulseExchange => "pulse_exchange",
            WorldScenario::TwinParadox => "twin_paradox",
            WorldScenario::RocketClocks => "rocket_clocks",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pulse_exchange" | "pulse-exchange" | "pulse" => Some(WorldScenario::PulseExchange),
            "twin_paradox" | "twin-paradox" | "twins" => Some(WorldScenario::TwinParadox),
            "rocket_clocks" | "rocket-clocks" | "rockets" => Some(WorldScenario::RocketClocks),
            _ => None,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["pulse_exchange", "twin_paradox", "rocket_clocks"]
    }

    /// A horizon that comfortably covers the scenario's interesting window.
    pub fn horizon(&self) -> f64 {
        match self {
            WorldScenario::PulseExchange => 2.0,
            WorldScenario::TwinParadox => 110.0,
            WorldScenario::RocketClocks => 10.0,
        }
    }

    pub fn build(&self) -> Result<Simulator, SimulationError> {
        let mut sim = Simulator::new();
        match self {
            WorldScenario::PulseExchange => {
                let mut beacon = Obj::new("beacon");
                beacon.add_action(Action::pulse("beep", 0.0))?;
                sim.add_object(beacon, Vector4::ZERO, Vector3::ZERO, 0.0)?;
                sim.add_object(
                    Obj::new("listener"),
                    Vector4::new(0.0, 1.0, 0.0, 0.0),
                    Vector3::ZERO,
                    0.0,
                )?;
            }
            WorldScenario::TwinParadox => {
                sim.add_object(Obj::new("twin_old"), Vector4::ZERO, Vector3::ZERO, 0.0)?;
                let mut young = Obj::new("twin_young");
                let out = Vector3::new(1.0, 0.0, 0.0);
                for (i, direction) in [out, -out, -out, out].iter().enumerate() {
                    let tau_start = 4.0 * i as f64;
                    young.add_motion(Motion::LongitudinalAcceleration {
                        tau_start,
                        tau_end: tau_start + 4.0,
                        a: *direction,
                    })?;
                }
                young.add_action(Action::detect_collision(
                    4.0,
                    f64::INFINITY,
                    vec!["twin_old".to_string()],
                ))?;
                sim.add_object(young, Vector4::ZERO, Vector3::ZERO, 0.0)?;
            }
            WorldScenario::RocketClocks => {
                let a = Vector3::new(0.1, 0.0, 0.0);
                let mut bottom = Obj::new("bottom");
                bottom.add_motion(Motion::LongitudinalAcceleration {
                    tau_start: 0.0,
                    tau_end: f64::INFINITY,
                    a,
                })?;
                bottom.add_action(Action::sender("A", 0.0, 1.0))?;
                sim.add_object(bottom, Vector4::ZERO, Vector3::ZERO, 0.0)?;
                let mut top = Obj::new("top");
                top.add_motion(Motion::LongitudinalAcceleration {
                    tau_start: 0.0,
                    tau_end: f64::INFINITY,
                    a,
                })?;
                sim.add_object(top, Vector4::new(0.0, 1.0, 0.0, 0.0), Vector3::ZERO, 0.0)?;
            }
        }
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in WorldScenario::variants() {
            let scenario = WorldScenario::parse(name).unwrap();
            assert_eq!(scenario.as_str(), *name);
        }
        assert_eq!(WorldScenario::parse("twins"), Some(WorldScenario::TwinParadox));
        assert_eq!(WorldScenario::parse("nope"), None);
    }

    #[test]
    fn presets_build() {
        for name in WorldScenario::variants() {
            let scenario = WorldScenario::parse(name).unwrap();
            let sim = scenario.build().unwrap();
            assert!(!sim.world().object_order().is_empty());
        }
    }
}
