//! The manager: owns the world, constructs the single
//! vehicle entity at t=0, drives the fixed-step phase loop in order, and
//! handles termination and exit-code reporting.

use std::path::Path;

use log::{error, info};

use crate::atmosphere::AtmosphereModel;
use crate::components::{Bodytube, Finset, Nosecone, Parachute};
use crate::config::Config;
use crate::ecs::{EntityId, World};
use crate::error::SimError;
use crate::events::EventTag;
use crate::motor::Motor;
use crate::plugin::PluginHost;
use crate::rail::LaunchRail;
use crate::sinks::{SinkHandles, StateSnapshot};
use crate::state::PhysicsState;
use crate::systems::rules::FlightPhaseFlags;
use crate::systems::{aero, integrator, physics, rules};
use crate::types::{Quaternion, Vector3};

/// Manager-level termination reason, surfaced via `exit_code` as the
/// process's exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Landed,
    MaxTimeExceeded,
}

impl ExitStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitStatus::Landed => 0,
            ExitStatus::MaxTimeExceeded => 3,
        }
    }
}

/// Blueprint for the single vehicle entity the manager constructs at t=0.
///
/// Structural mass is not supplied directly: it is derived from each
/// attached component's own `get_mass()` (§4.4), so airframe mass always
/// tracks whatever geometry the caller actually assembled.
pub struct VehicleBlueprint {
    pub motor: Motor,
    pub nosecone: Nosecone,
    pub bodytube: Bodytube,
    pub finset: Option<Finset>,
    pub parachute: Option<Parachute>,
}

/// Owns the world and drives the fixed-step simulation loop.
pub struct Manager {
    world: World,
    config: Config,
    atmosphere: AtmosphereModel,
    rail: LaunchRail,
    plugins: PluginHost,
    flags: FlightPhaseFlags,
    vehicle: EntityId,
    workers: usize,
}

impl Manager {
    /// Constructs the manager's world and the single `PhysicsState`-bearing
    /// entity at t=0, seeded at the rail tip with orientation aligned to
    /// the rail vector.
    pub fn new(
        config: Config,
        vehicle: VehicleBlueprint,
        plugins: Vec<Box<dyn crate::plugin::ForcePlugin>>,
        workers: usize,
    ) -> Result<Self, SimError> {
        config.validate()?;

        let rail_cfg = &config.engine.options.launchrail;
        let angle_rad = rail_cfg.angle_deg.to_radians();
        let orientation_rad = rail_cfg.orientation_deg.to_radians();
        let rail = LaunchRail::new(rail_cfg.length, angle_rad, orientation_rad);

        let isa = config.engine.options.launchsite.atmosphere.isa;
        let atmosphere = AtmosphereModel::new(isa);

        let mut world = World::new();
        let entity = world.spawn();

        let radius = vehicle.bodytube.radius_m;
        let length = vehicle.bodytube.length_m;

        let structural_mass = vehicle.nosecone.get_mass()
            + vehicle.bodytube.get_mass()
            + vehicle.finset.as_ref().map(Finset::get_mass).unwrap_or(0.0);
        let total_planform_area = vehicle.nosecone.get_planform_area()
            + vehicle.bodytube.get_planform_area()
            + vehicle.finset.as_ref().map(Finset::get_planform_area).unwrap_or(0.0);
        info!(
            "derived airframe: structural mass {structural_mass:.4} kg, planform area {total_planform_area:.4} m^2"
        );

        let total_mass = structural_mass + vehicle.motor.get_mass();
        let inertia_scalar = (1.0 / 12.0) * total_mass * (3.0 * radius * radius + length * length);
        let inertia = nalgebra::Matrix3::from_diagonal_element(inertia_scalar);

        let mut state = PhysicsState::new(structural_mass, inertia);
        state.position = Vector3::new(0.0, 0.0, 0.0);
        state.orientation = rail_orientation(&rail);
        state.mass = total_mass;

        world.insert(entity, state);
        world.insert(entity, vehicle.motor);
        world.insert(entity, vehicle.nosecone);
        world.insert(entity, vehicle.bodytube);
        if let Some(finset) = vehicle.finset {
            world.insert(entity, finset);
        }
        if let Some(parachute) = vehicle.parachute {
            world.insert(entity, parachute);
        }

        let mut plugin_host = PluginHost::new(plugins);
        plugin_host.initialize()?;

        Ok(Self {
            world,
            config,
            atmosphere,
            rail,
            plugins: plugin_host,
            flags: FlightPhaseFlags::default(),
            vehicle: entity,
            workers: workers.max(1),
        })
    }

    /// Runs the fixed-step loop to completion, writing MOTION/DYNAMICS/EVENTS
    /// CSVs under `out_dir`. Returns the termination status on success; any
    /// non-sink error aborts the run and is returned unchanged.
    pub fn run(&mut self, out_dir: &Path) -> Result<ExitStatus, SimError> {
        let sinks = crate::sinks::spawn_sinks(
            &out_dir.join("MOTION.csv"),
            &out_dir.join("DYNAMICS.csv"),
            &out_dir.join("EVENTS.csv"),
            crate::sinks::MIN_SINK_CAPACITY,
        )?;

        let result = self.drive_loop(&sinks);
        sinks.close();
        let _ = self.plugins.cleanup();
        result
    }

    fn drive_loop(&mut self, sinks: &SinkHandles) -> Result<ExitStatus, SimError> {
        let dt = self.config.engine.simulation.step;
        let max_time = self.config.engine.simulation.max_time;
        let ground_tolerance = self.config.engine.simulation.ground_tolerance;
        let gravity = self.config.engine.options.launchsite.atmosphere.isa.gravitational_accel;

        loop {
            let time = self
                .world
                .get::<PhysicsState>(self.vehicle)
                .map(|s| s.time)
                .unwrap_or(0.0);

            if time >= max_time {
                info!("max_time {max_time:.3}s exceeded without landing");
                return Ok(ExitStatus::MaxTimeExceeded);
            }

            if let Err(e) = self.tick(dt, gravity, ground_tolerance, sinks) {
                error!("tick aborted: {e}");
                return Err(e);
            }

            if self.flags.had_landing {
                return Ok(ExitStatus::Landed);
            }
        }
    }

    fn tick(
        &mut self,
        dt: f64,
        gravity: f64,
        ground_tolerance: f64,
        sinks: &SinkHandles,
    ) -> Result<(), SimError> {
        if let Some(motor) = self.world.get_mut::<Motor>(self.vehicle) {
            motor.update(dt);
        }
        if let Some(motor) = self.world.get::<Motor>(self.vehicle).cloned() {
            if let Some(state) = self.world.get_mut::<PhysicsState>(self.vehicle) {
                state.update_mass(&motor);
            }
        }

        if !self.plugins.is_empty() {
            if let Some(state) = self.world.get_mut::<PhysicsState>(self.vehicle) {
                self.plugins.before_sim_step(state)?;
            }
        }

        if self.rail.is_on_rail() {
            self.step_on_rail(dt, gravity)?;
        } else {
            physics::step(&mut self.world, self.workers, gravity)?;
            aero::step(&mut self.world, &self.atmosphere, self.workers)?;
            integrator::step(&mut self.world, dt)?;
        }

        let (event, _halted) = rules::step(&mut self.world, &mut self.flags, self.vehicle, ground_tolerance);

        if !self.plugins.is_empty() {
            if let Some(state) = self.world.get::<PhysicsState>(self.vehicle) {
                self.plugins.after_sim_step(state)?;
            }
        }

        self.emit_snapshot(event, sinks);
        Ok(())
    }

    /// Runs the rail constraint for one tick, then advances
    /// `time` the same way the integrator would off-rail, since the rail
    /// phase owns the explicit-Euler step while the vehicle is captive.
    fn step_on_rail(&mut self, dt: f64, gravity: f64) -> Result<(), SimError> {
        let entity = self.vehicle;
        let motor = self
            .world
            .get::<Motor>(entity)
            .cloned()
            .ok_or(SimError::EntityValidationFailed { entity, field: "motor" })?;
        let mut motor = motor;

        if let Some(state) = self.world.get_mut::<PhysicsState>(entity) {
            crate::rail::step(&mut self.rail, &mut motor, state, gravity, dt);
            state.time += dt;
        }

        self.world.insert(entity, motor);
        Ok(())
    }

    fn emit_snapshot(&self, event: EventTag, sinks: &SinkHandles) {
        let state = match self.world.get::<PhysicsState>(self.vehicle) {
            Some(s) => s,
            None => return,
        };
        let motor_status = self
            .world
            .get::<Motor>(self.vehicle)
            .map(|m| m.state().as_str())
            .unwrap_or("IDLE");
        let parachute_status = self
            .world
            .get::<Parachute>(self.vehicle)
            .map(|p| if p.is_deployed() { "DEPLOYED" } else { "NONE" })
            .unwrap_or("NONE");
        let thrust = self
            .world
            .get::<Motor>(self.vehicle)
            .map(|m| m.thrust_now())
            .unwrap_or(0.0);

        let snapshot = StateSnapshot {
            time: state.time,
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            orientation: state.orientation,
            thrust,
            event,
            motor_status,
            parachute_status,
        };
        sinks.fan_out(&snapshot);
    }

    /// Ignites the vehicle's motor at the given simulated time; callers
    /// typically do this at t=0 before the first tick.
    pub fn ignite(&mut self, sim_time: f64) -> Result<(), SimError> {
        let entity = self.vehicle;
        let motor = self
            .world
            .get_mut::<Motor>(entity)
            .ok_or(SimError::EntityValidationFailed { entity, field: "motor" })?;
        motor.ignite(sim_time)
    }
}

fn rail_orientation(rail: &LaunchRail) -> Quaternion {
    let axis = rail.axis();
    let body_y = Vector3::new(0.0, 1.0, 0.0);
    Quaternion::rotation_between(&body_y, &axis).unwrap_or_else(Quaternion::identity)
}
