//! Runs one flight from a TOML configuration file and writes
//! MOTION.csv/DYNAMICS.csv/EVENTS.csv to an output directory.
//!
//! ```text
//! cargo run --example run_flight -- rocket.toml out/
//! ```

use std::env;
use std::path::PathBuf;
use std::process::exit;

use log::info;
use rocket_sim::components::{Bodytube, Nosecone, Parachute};
use rocket_sim::config::Config;
use rocket_sim::events::EventTag;
use rocket_sim::motor::{Motor, MotorProperties, ThrustCurve};
use rocket_sim::{Manager, VehicleBlueprint};

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let mut args = env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "rocket.toml".to_string());
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".to_string()));
    std::fs::create_dir_all(&out_dir).expect("failed to create output directory");

    let config = match Config::from_file(&PathBuf::from(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            exit(1);
        }
    };

    let plugins = match rocket_sim::plugin::load_from_paths(&config.setup.plugins.paths) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            exit(1);
        }
    };

    let vehicle = default_vehicle();
    let mut manager = match Manager::new(config, vehicle, plugins, 4) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("failed to construct manager: {e}");
            exit(1);
        }
    };

    manager.ignite(0.0).expect("ignition failed");

    match manager.run(&out_dir) {
        Ok(status) => {
            info!("run completed: {status:?}");
            exit(status.exit_code());
        }
        Err(e) => {
            eprintln!("run aborted: {e}");
            exit(2);
        }
    }
}

/// A small single-stage F-class motor airframe, used as a default when the
/// configuration file does not otherwise override geometry.
fn default_vehicle() -> VehicleBlueprint {
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
