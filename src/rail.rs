//! Launch rail component and pre-exit motion constraint.

use log::debug;

use crate::motor::Motor;
use crate::state::PhysicsState;
use crate::types::Vector3;

/// Physical rail geometry plus the `on_rail` flag that governs which
/// system drives the vehicle each tick (this module while `on_rail`,
/// otherwise the physics/aero/integrator phases).
#[derive(Debug, Clone, Copy)]
pub struct LaunchRail {
    pub length_m: f64,
    pub angle_rad: f64,
    pub orientation_rad: f64,
    exit_y: f64,
    on_rail: bool,
}

impl LaunchRail {
    pub fn new(length_m: f64, angle_rad: f64, orientation_rad: f64) -> Self {
        Self {
            length_m,
            angle_rad,
            orientation_rad,
            exit_y: length_m * angle_rad.cos(),
            on_rail: true,
        }
    }

    pub fn is_on_rail(&self) -> bool {
        self.on_rail
    }

    pub fn exit_altitude(&self) -> f64 {
        self.exit_y
    }

    /// Unit vector along the rail, tilted `angle_rad` from vertical.
    pub fn axis(&self) -> Vector3 {
        Vector3::new(self.angle_rad.sin(), self.angle_rad.cos(), 0.0)
    }
}

/// Runs the per-tick rail constraint while `rail.is_on_rail()`.
///
/// Resolves thrust-vs-gravity along the rail axis and either holds the
/// vehicle on the pad or explicit-Euler integrates it along the rail until
/// it has travelled `rail.length_m`. The motor clock and `state.mass` are
/// both kept current by the caller before this runs (a vehicle can still
/// be burning after rail exit).
///
/// Any force plugins accumulated into `state.accumulated_force` this tick
/// (e.g. wind) is projected onto the rail axis and folded into `f_rail`
/// before the accumulator is cleared, so it isn't silently dropped while
/// on-rail and then double-counted or dumped in one lump at rail exit.
pub fn step(rail: &mut LaunchRail, motor: &mut Motor, state: &mut PhysicsState, gravity: f64, dt: f64) {
    let thrust = motor.get_thrust();
    let angle = rail.angle_rad;
    let axis = rail.axis();
    let plugin_force_along_rail = state.accumulated_force.dot(&axis);
    state.reset_accumulators();

    let f_rail =
        thrust * angle.cos() - state.mass * gravity * angle.sin() + plugin_force_along_rail;

    let travelled = state.position.y / angle.cos().max(1e-9);

    if f_rail <= 0.0 && state.velocity.y <= 0.0 {
        state.velocity = Vector3::zeros();
        state.acceleration = Vector3::zeros();
        return;
    }

    let a = f_rail / state.mass;
    state.acceleration = Vector3::new(a * angle.sin(), a * angle.cos(), 0.0);
    state.velocity += state.acceleration * dt;
    state.position += state.velocity * dt;

    if travelled >= rail.length_m {
        debug!("rail exit after travelling {travelled:.3} m (rail length {:.3} m)", rail.length_m);
        rail.on_rail = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::{MotorProperties, ThrustCurve};
    use nalgebra::Matrix3;

    fn idle_motor() -> Motor {
        let curve = ThrustCurve::from_points(&[(0.0, 0.0), (1.0, 100.0)]).unwrap();
        Motor::new(
            curve,
            MotorProperties {
                propellant_mass_kg: 0.2,
                total_impulse_ns: 100.0,
                burn_time_s: 1.0,
                max_thrust_n: 100.0,
            },
        )
    }

    #[test]
    fn pad_hold_with_idle_motor() {
        let mut rail = LaunchRail::new(2.0, 5f64.to_radians(), 0.0);
        let mut motor = idle_motor();
        let mut state = PhysicsState::new(1.0, Matrix3::identity());

        step(&mut rail, &mut motor, &mut state, 9.81, 0.01);

        assert_eq!(state.velocity, Vector3::zeros());
        assert_eq!(state.position, Vector3::zeros());
        assert!(rail.is_on_rail());
    }

    #[test]
    fn exits_rail_once_travelled_distance_reached() {
        let mut rail = LaunchRail::new(0.001, 0.0, 0.0);
        let mut motor = idle_motor();
        motor.ignite(0.0).unwrap();
        motor.update(0.01);
        let mut state = PhysicsState::new(1.0, Matrix3::identity());

        step(&mut rail, &mut motor, &mut state, 9.81, 0.01);

        assert!(!rail.is_on_rail());
    }
}
