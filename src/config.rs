//! Engine configuration: a nested structure deserialized from TOML, using
//! `toml` over nested structs rather than `serde_yaml` since the dotted
//! keys (`engine.options.launchrail` etc.) read naturally as TOML tables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atmosphere::IsaConfig;
use crate::error::SimError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub step: f64,
    pub max_time: f64,
    pub ground_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRailConfig {
    pub length: f64,
    pub angle_deg: f64,
    pub orientation_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSiteConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub atmosphere: AtmosphereConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    pub isa: IsaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    pub launchrail: LaunchRailConfig,
    pub launchsite: LaunchSiteConfig,
    pub motor_designation: String,
    pub openrocket_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub options: EngineOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self { paths: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(default = "default_setup")]
    pub setup: SetupConfig,
}

fn default_setup() -> SetupConfig {
    SetupConfig {
        plugins: PluginsConfig::default(),
        logging: default_logging(),
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, SimError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| SimError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// All numeric fields must be finite; `step > 0`; rail angle in
    /// `[0, 90]` degrees; `max_time > step`.
    pub fn validate(&self) -> Result<(), SimError> {
        let sim = &self.engine.simulation;
        if !sim.step.is_finite() || sim.step <= 0.0 {
            return Err(SimError::ConfigInvalid(
                "engine.simulation.step must be finite and > 0".into(),
            ));
        }
        if !sim.max_time.is_finite() || sim.max_time <= sim.step {
            return Err(SimError::ConfigInvalid(
                "engine.simulation.max_time must be finite and > step".into(),
            ));
        }
        if !sim.ground_tolerance.is_finite() || sim.ground_tolerance < 0.0 {
            return Err(SimError::ConfigInvalid(
                "engine.simulation.ground_tolerance must be finite and >= 0".into(),
            ));
        }

        let rail = &self.engine.options.launchrail;
        if !(0.0..=90.0).contains(&rail.angle_deg) {
            return Err(SimError::ConfigInvalid(
                "engine.options.launchrail.angle_deg must be within [0, 90]".into(),
            ));
        }
        if !rail.length.is_finite() || rail.length <= 0.0 {
            return Err(SimError::ConfigInvalid(
                "engine.options.launchrail.length must be finite and > 0".into(),
            ));
        }
        if !rail.orientation_deg.is_finite() {
            return Err(SimError::ConfigInvalid(
                "engine.options.launchrail.orientation_deg must be finite".into(),
            ));
        }

        let site = &self.engine.options.launchsite;
        for (name, value) in [
            ("latitude", site.latitude),
            ("longitude", site.longitude),
            ("altitude", site.altitude),
        ] {
            if !value.is_finite() {
                return Err(SimError::ConfigInvalid(format!(
                    "engine.options.launchsite.{name} must be finite"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_toml() -> &'static str {
        r#"
        [engine.simulation]
        step = 0.01
        max_time = 60.0
        ground_tolerance = 0.1

        [engine.options.launchrail]
        length = 2.0
        angle_deg = 5.0
        orientation_deg = 0.0

        [engine.options.launchsite]
        latitude = 32.99
        longitude = -106.97
        altitude = 1200.0

        [engine.options.launchsite.atmosphere.isa]
        sea_level_density = 1.225
        sea_level_temperature = 288.15
        sea_level_pressure = 101325.0
        specific_gas_constant = 287.052874
        gravitational_accel = 9.80665
        ratio_specific_heats = 1.4
        temperature_lapse_rate = -0.0065

        engine.options.motor_designation = "F15"
        engine.options.openrocket_file = "rocket.ork"
        "#
    }

    #[test]
    fn parses_valid_config() {
        let config = Config::from_toml_str(valid_toml()).unwrap();
        assert_eq!(config.engine.simulation.step, 0.01);
        assert_eq!(config.setup.logging.level, "info");
    }

    #[test]
    fn rejects_non_positive_step() {
        let bad = valid_toml().replace("step = 0.01", "step = 0.0");
        assert!(Config::from_toml_str(&bad).is_err());
    }

    #[test]
    fn rejects_rail_angle_out_of_range() {
        let bad = valid_toml().replace("angle_deg = 5.0", "angle_deg = 120.0");
        assert!(Config::from_toml_str(&bad).is_err());
    }

    #[test]
    fn rejects_max_time_not_exceeding_step() {
        let bad = valid_toml().replace("max_time = 60.0", "max_time = 0.001");
        assert!(Config::from_toml_str(&bad).is_err());
    }
}
