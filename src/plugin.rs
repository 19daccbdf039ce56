//! External force-contributor plugins.
//!
//! Dynamic library loading is not used here: a static composition of
//! `Box<dyn ForcePlugin>` trait objects is the equivalent, preferable
//! form where dynamic loading isn't required. Plugins run on
//! the manager thread, never the worker pools, so they always see a
//! consistent, non-partially-integrated state.

use log::info;

use crate::error::SimError;
use crate::state::PhysicsState;

/// An external contributor to the force/moment accumulators.
///
/// `before_sim_step` may mutate `accumulated_force`/`accumulated_moment`
/// on the state it is given; it must not touch position, velocity, or
/// orientation. `after_sim_step` is a read-only observation hook run once
/// integration has completed for the tick.
pub trait ForcePlugin: Send {
    fn name(&self) -> &str;
    fn version(&self) -> &str;

    fn initialize(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn before_sim_step(&mut self, state: &mut PhysicsState) -> Result<(), SimError>;

    fn after_sim_step(&mut self, _state: &PhysicsState) -> Result<(), SimError> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// Owns the loaded plugins in load order and drives their lifecycle hooks.
pub struct PluginHost {
    plugins: Vec<Box<dyn ForcePlugin>>,
}

impl PluginHost {
    pub fn new(plugins: Vec<Box<dyn ForcePlugin>>) -> Self {
        Self { plugins }
    }

    pub fn initialize(&mut self) -> Result<(), SimError> {
        for plugin in &mut self.plugins {
            info!("initializing plugin '{}' v{}", plugin.name(), plugin.version());
            plugin.initialize()?;
        }
        Ok(())
    }

    /// Invoked in load order before the physics force phase; an error from
    /// any plugin aborts the tick.
    pub fn before_sim_step(&mut self, state: &mut PhysicsState) -> Result<(), SimError> {
        for plugin in &mut self.plugins {
            plugin
                .before_sim_step(state)
                .map_err(|e| wrap(plugin.name(), e))?;
        }
        Ok(())
    }

    pub fn after_sim_step(&mut self, state: &PhysicsState) -> Result<(), SimError> {
        for plugin in &mut self.plugins {
            plugin
                .after_sim_step(state)
                .map_err(|e| wrap(plugin.name(), e))?;
        }
        Ok(())
    }

    pub fn cleanup(&mut self) -> Result<(), SimError> {
        for plugin in &mut self.plugins {
            plugin.cleanup()?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// A constant wind-drift force, aligned with the world X axis, applied
/// while the vehicle is off the pad. Models the wind-plugin call contract
/// (§1's external wind library) as a trivial built-in rather than a
/// standalone crate: the rest of the engine only ever depends on the
/// `ForcePlugin` trait, never on this implementation directly.
pub struct ConstantWind {
    speed_mps: f64,
}

impl ConstantWind {
    pub fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }
}

impl ForcePlugin for ConstantWind {
    fn name(&self) -> &str {
        "constant_wind"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn before_sim_step(&mut self, state: &mut PhysicsState) -> Result<(), SimError> {
        let drag_like = 0.5 * self.speed_mps.abs() * self.speed_mps * state.mass.min(1.0);
        state.add_force(crate::types::Vector3::new(drag_like * 0.01, 0.0, 0.0));
        Ok(())
    }
}

/// Resolves `setup.plugins.paths` (§6) against a small built-in registry,
/// since this engine composes plugins statically rather than `dlopen`-ing
/// shared objects (see the module doc comment). Each path is treated as a
/// plugin name; `constant_wind[:<speed>]` loads [`ConstantWind`]. Unknown
/// names fail the whole load with `PluginError` so a typo in configuration
/// is caught at startup rather than silently dropped.
pub fn load_from_paths(paths: &[String]) -> Result<Vec<Box<dyn ForcePlugin>>, SimError> {
    let mut plugins: Vec<Box<dyn ForcePlugin>> = Vec::new();
    for path in paths {
        let mut parts = path.splitn(2, ':');
        let name = parts.next().unwrap_or_default();
        match name {
            "constant_wind" => {
                let speed = parts
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(5.0);
                plugins.push(Box::new(ConstantWind::new(speed)));
            }
            other => {
                return Err(SimError::PluginError {
                    plugin: other.to_string(),
                    message: "no built-in plugin registered under this name".to_string(),
                });
            }
        }
    }
    Ok(plugins)
}

fn wrap(plugin: &str, source: SimError) -> SimError {
    match source {
        SimError::PluginError { .. } => source,
        other => SimError::PluginError {
            plugin: plugin.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    struct ConstantForce {
        force_y: f64,
    }

    impl ForcePlugin for ConstantForce {
        fn name(&self) -> &str {
            "constant-force"
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn before_sim_step(&mut self, state: &mut PhysicsState) -> Result<(), SimError> {
            state.add_force(crate::types::Vector3::new(0.0, self.force_y, 0.0));
            Ok(())
        }
    }

    struct FailingPlugin;

    impl ForcePlugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }
        fn version(&self) -> &str {
            "0.0.1"
        }
        fn before_sim_step(&mut self, _state: &mut PhysicsState) -> Result<(), SimError> {
            Err(SimError::PluginError {
                plugin: "failing".into(),
                message: "boom".into(),
            })
        }
    }

    #[test]
    fn plugin_adds_force_before_physics_phase() {
        let mut host = PluginHost::new(vec![Box::new(ConstantForce { force_y: 5.0 })]);
        let mut state = PhysicsState::new(1.0, Matrix3::identity());
        host.before_sim_step(&mut state).unwrap();
        assert_eq!(state.accumulated_force.y, 5.0);
    }

    #[test]
    fn plugin_error_aborts_the_tick() {
        let mut host = PluginHost::new(vec![Box::new(FailingPlugin)]);
        let mut state = PhysicsState::new(1.0, Matrix3::identity());
        assert!(host.before_sim_step(&mut state).is_err());
    }

    #[test]
    fn empty_host_reports_empty() {
        let host = PluginHost::new(vec![]);
        assert!(host.is_empty());
    }

    #[test]
    fn load_from_paths_resolves_known_plugin() {
        let plugins = load_from_paths(&["constant_wind:8.0".to_string()]).unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name(), "constant_wind");
    }

    #[test]
    fn load_from_paths_rejects_unknown_plugin() {
        assert!(load_from_paths(&["not_a_real_plugin".to_string()]).is_err());
    }

    #[test]
    fn constant_wind_adds_force_without_touching_kinematics() {
        let mut wind = ConstantWind::new(5.0);
        let mut state = PhysicsState::new(1.0, Matrix3::identity());
        let position_before = state.position;
        wind.before_sim_step(&mut state).unwrap();
        assert!(state.accumulated_force.x > 0.0);
        assert_eq!(state.position, position_before);
    }
}
