//! End-to-end flight scenarios exercising the manager's fixed-step loop
//! against the CSV sinks, matching the concrete scenarios spec.md §8 lists.

use approx::assert_relative_eq;
use tempfile::tempdir;

use rocket_sim::components::{Bodytube, Nosecone, Parachute};
use rocket_sim::config::{
    AtmosphereConfig, Config, EngineConfig, EngineOptions, LaunchRailConfig, LaunchSiteConfig,
    PluginsConfig, SetupConfig, SimulationConfig,
};
use rocket_sim::events::EventTag;
use rocket_sim::motor::{Motor, MotorProperties, ThrustCurve};
use rocket_sim::{ExitStatus, Manager, VehicleBlueprint};

fn config(step: f64, max_time: f64, rail_angle_deg: f64) -> Config {
    Config {
        engine: EngineConfig {
            simulation: SimulationConfig {
                step,
                max_time,
                ground_tolerance: 0.1,
            },
            options: EngineOptions {
                launchrail: LaunchRailConfig {
                    length: 2.0,
                    angle_deg: rail_angle_deg,
                    orientation_deg: 0.0,
                },
                launchsite: LaunchSiteConfig {
                    latitude: 32.99,
                    longitude: -106.97,
                    altitude: 1200.0,
                    atmosphere: AtmosphereConfig {
                        isa: rocket_sim::atmosphere::IsaConfig::default(),
                    },
                },
                motor_designation: "F15".into(),
                openrocket_file: "rocket.ork".into(),
            },
        },
        setup: SetupConfig {
            plugins: PluginsConfig::default(),
            logging: rocket_sim::config::LoggingConfig { level: "info".into() },
        },
    }
}

fn single_stage_vehicle() -> VehicleBlueprint {
    let curve =
        ThrustCurve::from_points(&[(0.0, 0.0), (0.2, 180.0), (1.0, 150.0), (1.6, 0.0)]).unwrap();
    let motor = Motor::new(
        curve,
        MotorProperties {
            propellant_mass_kg: 0.06,
            total_impulse_ns: 200.0,
            burn_time_s: 1.6,
            max_thrust_n: 180.0,
        },
    );
    VehicleBlueprint {
        motor,
        nosecone: Nosecone::new(0.15, 0.025, 0.05),
        bodytube: Bodytube::new(0.5, 0.025, 0.2),
        finset: None,
        parachute: Some(Parachute::new(1.5, 0.3, EventTag::Apogee)),
    }
}

#[test]
fn full_flight_lands_and_writes_every_csv() {
    let cfg = config(0.01, 120.0, 3.0);
    let mut manager = Manager::new(cfg, single_stage_vehicle(), vec![], 4).unwrap();
    manager.ignite(0.0).unwrap();

    let dir = tempdir().unwrap();
    let status = manager.run(dir.path()).unwrap();
    assert_eq!(status, ExitStatus::Landed);

    let motion = std::fs::read_to_string(dir.path().join("MOTION.csv")).unwrap();
    assert!(motion.starts_with("time,altitude,velocity,acceleration,thrust"));
    assert!(motion.lines().count() > 10);

    let dynamics = std::fs::read_to_string(dir.path().join("DYNAMICS.csv")).unwrap();
    assert!(dynamics.starts_with("time,px,py,pz,vx,vy,vz,ax,ay,az,qx,qy,qz,qw"));

    let events = std::fs::read_to_string(dir.path().join("EVENTS.csv")).unwrap();
    assert!(events.starts_with("time,event_name,motor_status,parachute_status"));
    for name in ["Liftoff", "Burnout", "Apogee", "ParachuteDeploy", "Land"] {
        assert!(events.contains(name), "missing {name} in EVENTS.csv:\n{events}");
    }
}

#[test]
fn max_time_exceeded_without_ignition() {
    let cfg = config(0.1, 0.5, 3.0);
    let mut manager = Manager::new(cfg, single_stage_vehicle(), vec![], 2).unwrap();
    let dir = tempdir().unwrap();
    let status = manager.run(dir.path()).unwrap();
    assert_eq!(status, ExitStatus::MaxTimeExceeded);
    assert_eq!(status.exit_code(), 3);
}

#[test]
fn landed_exit_code_is_zero() {
    let cfg = config(0.01, 120.0, 0.0);
    let mut manager = Manager::new(cfg, single_stage_vehicle(), vec![], 4).unwrap();
    manager.ignite(0.0).unwrap();
    let dir = tempdir().unwrap();
    let status = manager.run(dir.path()).unwrap();
    assert_eq!(status.exit_code(), 0);
}

/// §8 scenario 6: the same flight under different worker-pool widths
/// produces bit-identical MOTION.csv output, because each worker owns a
/// disjoint entity and force accumulation is commutative/associative.
#[test]
fn parallel_worker_count_does_not_change_motion_output() {
    let mut outputs = Vec::new();
    for workers in [1, 2, 4, 8] {
        let cfg = config(0.02, 60.0, 2.0);
        let mut manager = Manager::new(cfg, single_stage_vehicle(), vec![], workers).unwrap();
        manager.ignite(0.0).unwrap();
        let dir = tempdir().unwrap();
        manager.run(dir.path()).unwrap();
        outputs.push(std::fs::read_to_string(dir.path().join("MOTION.csv")).unwrap());
    }
    for other in &outputs[1..] {
        assert_eq!(&outputs[0], other);
    }
}

/// §8 scenario 1: pad hold — idle motor, rail tilted, one short tick.
#[test]
fn pad_hold_with_idle_motor_stays_on_rail() {
    let cfg = config(0.01, 30.0, 5.0);
    let mut manager = Manager::new(cfg, single_stage_vehicle(), vec![], 2).unwrap();
    let dir = tempdir().unwrap();
    let status = manager.run(dir.path()).unwrap();
    assert_eq!(status, ExitStatus::MaxTimeExceeded);

    let motion = std::fs::read_to_string(dir.path().join("MOTION.csv")).unwrap();
    let first_row = motion.lines().nth(1).unwrap();
    let fields: Vec<&str> = first_row.split(',').collect();
    let altitude: f64 = fields[1].parse().unwrap();
    let velocity: f64 = fields[2].parse().unwrap();
    assert_relative_eq!(altitude, 0.0, epsilon = 1e-9);
    assert_relative_eq!(velocity, 0.0, epsilon = 1e-9);
}

#[test]
fn rejects_invalid_configuration_at_construction() {
    let mut cfg = config(0.01, 60.0, 3.0);
    cfg.engine.simulation.step = 0.0;
    let err = Manager::new(cfg, single_stage_vehicle(), vec![], 2).unwrap_err();
    assert!(matches!(err, rocket_sim::SimError::ConfigInvalid(_)));
}
