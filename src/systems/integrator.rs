//! Semi-implicit Euler integrator: applies accumulated force/moment,
//! advances kinematics and orientation, clamps to ground, resets
//! accumulators for the next tick.

use crate::ecs::{EntityId, World};
use crate::error::SimError;
use crate::state::PhysicsState;
use crate::types::{self, Quaternion, Vector3};

pub fn step(world: &mut World, dt: f64) -> Result<(), SimError> {
    let entities: Vec<EntityId> = world.entities().collect();
    for entity in entities {
        if let Some(state) = world.get_mut::<PhysicsState>(entity) {
            integrate_one(state, dt)?;
        }
    }
    Ok(())
}

fn integrate_one(state: &mut PhysicsState, dt: f64) -> Result<(), SimError> {
    let acceleration = types::divide_scalar(state.accumulated_force, state.mass);
    // Aero already derived angular_acceleration from the current moment and
    // mass-dependent inertia (state.inertia_inv is only refreshed at
    // construction, so recomputing from accumulated_moment here would use a
    // stale inertia once propellant burns off).
    let angular_acceleration = state.angular_acceleration;

    let velocity = state.velocity + acceleration * dt;
    let position = state.position + velocity * dt;

    let angular_velocity = state.angular_velocity + angular_acceleration * dt;
    let half_dt_omega = angular_velocity * (0.5 * dt);
    let delta = Quaternion::new(half_dt_omega);
    let orientation = (state.orientation * delta).normalize();

    if !all_finite(&[acceleration, velocity, position, angular_velocity])
        || !orientation.as_vector().iter().all(|v| v.is_finite())
    {
        return Err(SimError::NumericFailure {
            context: "integrator",
        });
    }

    state.acceleration = acceleration;
    state.velocity = velocity;
    state.position = position;
    state.angular_velocity = angular_velocity;
    state.angular_acceleration = angular_acceleration;
    state.orientation = orientation;

    ground_clamp(state);

    state.reset_accumulators();
    state.time += dt;

    Ok(())
}

/// Inelastic, terminal ground contact: once the vehicle
/// is at or below the ground with downward velocity, it stops completely.
fn ground_clamp(state: &mut PhysicsState) {
    if state.position.y <= 0.0 && state.velocity.y < 0.0 {
        state.position.y = 0.0;
        state.velocity = Vector3::zeros();
        state.angular_acceleration = Vector3::zeros();
    }
}

fn all_finite(vectors: &[Vector3]) -> bool {
    vectors.iter().all(|v| v.iter().all(|c| c.is_finite()))
}
