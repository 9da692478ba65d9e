//! # Configuration
//!
//! Scenario tunables passed explicitly at construction time. A config can be
//! built in code, taken from one of the bundled presets, or read from TOML:
//!
//! ```toml
//! timestep = 0.05
//! direction = "current"
//!
//! [agent]
//! radius = 3.0
//! max_speed = 30.0
//! max_force = 50.0
//! horizon = 10.0
//! k = 3.0
//! avoid_weight = 15.0
//! sidestep_weight = 15.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CrowdError, Result};
use crate::steering::AvoidanceDirection;
use crate::structs::AgentParams;

/// Tunings for the bundled demo scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPreset {
    Room,
    Airplane,
    Museum,
    Performer,
    Subway,
    Walkway,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 6] = [
        ScenarioPreset::Room,
        ScenarioPreset::Airplane,
        ScenarioPreset::Museum,
        ScenarioPreset::Performer,
        ScenarioPreset::Subway,
        ScenarioPreset::Walkway,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrowdConfig {
    /// Simulation time advanced per tick.
    pub timestep: f64,
    #[serde(default)]
    pub direction: AvoidanceDirection,
    /// Parameters given to every agent the scenario spawns.
    pub agent: AgentParams,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        CrowdConfig {
            timestep: 0.005,
            direction: AvoidanceDirection::Predicted,
            agent: AgentParams::new(1.0, 10.0, 75.0, 50.0, 2.0),
        }
    }
}

impl CrowdConfig {
    pub fn preset(preset: ScenarioPreset) -> Self {
        // radius, max_speed, max_force, horizon, k, avoid, sidestep
        let (radius, max_speed, max_force, horizon, k, avoid, sidestep) = match preset {
            ScenarioPreset::Room => (3.0, 30.0, 50.0, 10.0, 3.0, 15.0, 15.0),
            ScenarioPreset::Airplane => (3.0, 5.0, 30.0, 5.0, 2.0, 10.0, 5.0),
            ScenarioPreset::Museum => (3.0, 30.0, 150.0, 3.0, 3.0, 15.0, 15.0),
            ScenarioPreset::Performer => (3.0, 22.5, 150.0, 30.0, 6.0, 15.0, 15.0),
            ScenarioPreset::Subway => (3.0, 15.0, 50.0, 7.5, 5.0, 15.0, 15.0),
            ScenarioPreset::Walkway => (3.0, 15.0, 90.0, 15.0, 2.0, 15.0, 15.0),
        };
        CrowdConfig {
            timestep: 0.05,
            direction: AvoidanceDirection::Current,
            agent: AgentParams::new(radius, max_speed, max_force, horizon, k)
                .with_weights(avoid, sidestep),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(CrowdError::InvalidTimestep(self.timestep));
        }
        self.agent.validate()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CrowdConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        CrowdConfig::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{DEFAULT_SIDESTEP_WEIGHT, DEFAULT_YIELD_FACTOR};

    #[test]
    fn test_default_is_valid() {
        let config = CrowdConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.direction, AvoidanceDirection::Predicted);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in ScenarioPreset::ALL {
            let config = CrowdConfig::preset(preset);
            assert!(config.validate().is_ok(), "{:?} preset should validate", preset);
            assert_eq!(config.timestep, 0.05);
        }
    }

    #[test]
    fn test_room_preset_values() {
        let config = CrowdConfig::preset(ScenarioPreset::Room);
        assert_eq!(config.agent.radius, 3.0);
        assert_eq!(config.agent.max_speed, 30.0);
        assert_eq!(config.agent.max_force, 50.0);
        assert_eq!(config.agent.horizon, 10.0);
        assert_eq!(config.agent.k, 3.0);
        assert_eq!(config.agent.avoid_weight, 15.0);
        assert_eq!(config.agent.sidestep_weight, 15.0);
    }

    #[test]
    fn test_from_toml_full() {
        let content = r#"
            timestep = 0.05
            direction = "current"

            [agent]
            radius = 3.0
            max_speed = 30.0
            max_force = 50.0
            horizon = 10.0
            k = 3.0
            avoid_weight = 15.0
            sidestep_weight = 15.0
            yield_factor = 4.0
        "#;
        let config = CrowdConfig::from_toml_str(content).unwrap();
        assert_eq!(config.direction, AvoidanceDirection::Current);
        assert_eq!(config.agent.yield_factor, 4.0);
        assert_eq!(config.agent.sidestep_weight, 15.0);
    }

    #[test]
    fn test_from_toml_defaults_optional_fields() {
        let content = r#"
            timestep = 0.01

            [agent]
            radius = 1.0
            max_speed = 10.0
            max_force = 75.0
            horizon = 50.0
            k = 2.0
        "#;
        let config = CrowdConfig::from_toml_str(content).unwrap();
        assert_eq!(config.direction, AvoidanceDirection::Predicted);
        assert_eq!(config.agent.sidestep_weight, DEFAULT_SIDESTEP_WEIGHT);
        assert_eq!(config.agent.yield_factor, DEFAULT_YIELD_FACTOR);
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let content = r#"
            timestep = 0.01

            [agent]
            radius = -1.0
            max_speed = 10.0
            max_force = 75.0
            horizon = 50.0
            k = 2.0
        "#;
        assert!(matches!(
            CrowdConfig::from_toml_str(content),
            Err(CrowdError::InvalidParameter { name: "radius", .. })
        ));

        let content = r#"
            timestep = 0.0

            [agent]
            radius = 1.0
            max_speed = 10.0
            max_force = 75.0
            horizon = 50.0
            k = 2.0
        "#;
        assert!(matches!(
            CrowdConfig::from_toml_str(content),
            Err(CrowdError::InvalidTimestep(_))
        ));
    }

    #[test]
    fn test_from_toml_rejects_malformed() {
        assert!(matches!(
            CrowdConfig::from_toml_str("timestep = "),
            Err(CrowdError::Config(_))
        ));
        assert!(matches!(
            CrowdConfig::from_toml_str("timestep = 0.1"),
            Err(CrowdError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = CrowdConfig::load("/nonexistent/crowd.toml");
        assert!(matches!(result, Err(CrowdError::Io(_))));
    }
}
