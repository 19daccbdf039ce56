//! Physics system: gravity + thrust accumulation, parallel
//! across entities via a fixed worker pool.
//!
//! The pool shape — a bounded pool of `std::thread` workers pulling from a
//! shared `crossbeam_channel`, with the caller joining on a results channel
//! before the phase is considered complete — uses `crossbeam_channel`
//! rather than `std::sync::mpsc` or a data-parallel `rayon` iterator. An
//! unbuffered (`bounded(0)`) work channel means a worker only dequeues a
//! job once it is ready for it.

use std::thread;

use crossbeam_channel::bounded;
use log::warn;

use crate::ecs::{EntityId, World};
use crate::error::SimError;
use crate::motor::Motor;
use crate::state::PhysicsState;
use crate::types::Vector3;
use crate::components::{Bodytube, Nosecone};

/// One unit of force-accumulation work for a single entity.
struct Job {
    entity: EntityId,
    gravity: f64,
}

/// Runs the gravity + thrust phase over every entity with a `PhysicsState`,
/// spawning `workers` threads that each own a disjoint subset of entities
/// for the duration of the phase.
pub fn step(world: &mut World, workers: usize, gravity: f64) -> Result<(), SimError> {
    let entities: Vec<EntityId> = world.entities().collect();
    for entity in &entities {
        validate(world, *entity)?;
    }

    let workers = workers.max(1).min(entities.len().max(1));
    let (job_tx, job_rx) = bounded::<Job>(0);
    let (result_tx, result_rx) = bounded::<(EntityId, Vector3)>(entities.len().max(1));

    let world_ref: &World = world;
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let force = compute_entity_force(world_ref, job.entity, job.gravity);
                    if result_tx.send((job.entity, force)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for entity in &entities {
            let _ = job_tx.send(Job {
                entity: *entity,
                gravity,
            });
        }
        drop(job_tx);
    });

    // `world_ref`'s last use was inside the now-joined scope; the borrow
    // it held is over, so entities can be mutated with the results.
    for _ in 0..entities.len() {
        if let Ok((entity, force)) = result_rx.recv() {
            if let Some(state) = world.get_mut::<PhysicsState>(entity) {
                state.add_force(force);
            }
        }
    }

    Ok(())
}

fn validate(world: &World, entity: EntityId) -> Result<(), SimError> {
    let state = world.get::<PhysicsState>(entity).ok_or(SimError::EntityValidationFailed {
        entity,
        field: "physics_state",
    })?;
    if !state.position.iter().all(|v| v.is_finite()) {
        return Err(SimError::EntityValidationFailed { entity, field: "position" });
    }
    if !state.velocity.iter().all(|v| v.is_finite()) {
        return Err(SimError::EntityValidationFailed { entity, field: "velocity" });
    }
    if !state.acceleration.iter().all(|v| v.is_finite()) {
        return Err(SimError::EntityValidationFailed { entity, field: "acceleration" });
    }
    if !(state.mass > 0.0) {
        return Err(SimError::EntityValidationFailed { entity, field: "mass" });
    }
    if world.get::<Nosecone>(entity).is_none() {
        return Err(SimError::EntityValidationFailed { entity, field: "nosecone" });
    }
    if world.get::<Bodytube>(entity).is_none() {
        return Err(SimError::EntityValidationFailed { entity, field: "bodytube" });
    }
    Ok(())
}

/// Gravity plus (if burning) thrust, in world frame. Does not mutate
/// anything — callers add the result to `accumulated_force`.
fn compute_entity_force(world: &World, entity: EntityId, gravity: f64) -> Vector3 {
    let state = match world.get::<PhysicsState>(entity) {
        Some(s) => s,
        None => return Vector3::zeros(),
    };

    let mut force = Vector3::new(0.0, -gravity * state.mass, 0.0);

    if let Some(motor) = world.get::<Motor>(entity) {
        if motor.is_coasting() {
            return force;
        }
        let local_thrust = Vector3::new(0.0, motor.thrust_now(), 0.0);
        force += crate::types::rotate_vector(&state.orientation, local_thrust);
    }

    force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Bodytube, Nosecone};
    use crate::motor::{MotorProperties, ThrustCurve};
    use nalgebra::Matrix3;

    fn rocket_world() -> (World, EntityId) {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, PhysicsState::new(1.0, Matrix3::identity()));
        world.insert(e, Nosecone::new(0.3, 0.05, 0.2));
        world.insert(e, Bodytube::new(1.0, 0.05, 0.5));
        (world, e)
    }

    #[test]
    fn gravity_only_without_motor() {
        let (mut world, e) = rocket_world();
        step(&mut world, 4, 9.81).unwrap();
        let state = world.get::<PhysicsState>(e).unwrap();
        assert!((state.accumulated_force.y + 9.81).abs() < 1e-9);
    }

    #[test]
    fn missing_nosecone_fails_validation() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, PhysicsState::new(1.0, Matrix3::identity()));
        world.insert(e, Bodytube::new(1.0, 0.05, 0.5));
        assert!(step(&mut world, 2, 9.81).is_err());
    }

    #[test]
    fn parallel_worker_counts_agree() {
        for workers in [1, 2, 4, 8] {
            let (mut world, e) = rocket_world();
            step(&mut world, workers, 9.81).unwrap();
            let state = world.get::<PhysicsState>(e).unwrap();
            assert!((state.accumulated_force.y + 9.81).abs() < 1e-9);
        }
    }
}
