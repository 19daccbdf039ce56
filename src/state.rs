//! The per-entity physics record, as an ECS component.

use crate::events::EventTag;
use crate::types::{Matrix3x3, Quaternion, Vector3};

/// Translational and rotational state plus the per-tick force/moment
/// accumulators. One `PhysicsState` is attached per simulated vehicle
/// entity; `Motor`/`Nosecone`/`Bodytube`/`Finset`/`Parachute` are attached
/// separately (each may be absent) and looked up by entity id, following
/// the ECS's "stable entity identity + per-entity accessors" contract
/// rather than being embedded as fields here.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub orientation: Quaternion,
    pub angular_velocity: Vector3,
    pub angular_acceleration: Vector3,

    /// Dry mass: airframe, motor casing, recovery hardware — everything
    /// that isn't consumed propellant.
    pub structural_mass: f64,
    pub mass: f64,
    pub inertia: Matrix3x3,
    pub inertia_inv: Matrix3x3,

    pub accumulated_force: Vector3,
    pub accumulated_moment: Vector3,

    pub time: f64,
    pub last_event: EventTag,
}

impl PhysicsState {
    pub fn new(structural_mass: f64, inertia: Matrix3x3) -> Self {
        let inertia_inv = inertia
            .try_inverse()
            .unwrap_or_else(Matrix3x3::identity);
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            orientation: Quaternion::identity(),
            angular_velocity: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
            structural_mass,
            mass: structural_mass,
            inertia,
            inertia_inv,
            accumulated_force: Vector3::zeros(),
            accumulated_moment: Vector3::zeros(),
            time: 0.0,
            last_event: EventTag::None,
        }
    }

    /// Recomputes `mass` as structural mass plus remaining propellant.
    /// Called once per tick by whichever phase owns the motor clock that
    /// tick (rail while on-rail, physics system once off-rail).
    pub fn update_mass(&mut self, motor: &crate::motor::Motor) {
        self.mass = self.structural_mass + motor.get_mass();
    }

    pub fn add_force(&mut self, force: Vector3) {
        self.accumulated_force += force;
    }

    pub fn add_moment(&mut self, moment: Vector3) {
        self.accumulated_moment += moment;
    }

    pub fn reset_accumulators(&mut self) {
        self.accumulated_force = Vector3::zeros();
        self.accumulated_moment = Vector3::zeros();
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.acceleration.iter().all(|v| v.is_finite())
            && self.orientation.as_vector().iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
            && self.angular_acceleration.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_zeroed_kinematics_and_identity_orientation() {
        let state = PhysicsState::new(1.0, Matrix3x3::identity());
        assert_eq!(state.position, Vector3::zeros());
        assert!(crate::types::is_unit_quaternion(&state.orientation, 1e-9));
    }

    #[test]
    fn accumulators_reset_to_zero() {
        let mut state = PhysicsState::new(1.0, Matrix3x3::identity());
        state.add_force(Vector3::new(1.0, 2.0, 3.0));
        state.reset_accumulators();
        assert_eq!(state.accumulated_force, Vector3::zeros());
    }

    #[test]
    fn detects_non_finite_state() {
        let mut state = PhysicsState::new(1.0, Matrix3x3::identity());
        assert!(state.is_finite());
        state.velocity.x = f64::NAN;
        assert!(!state.is_finite());
    }
}
