//! Aerodynamics system: drag force and pitch moment from state + atmosphere,
//! same worker-pool parallelism model as the physics system.

use std::thread;

use crossbeam_channel::bounded;

use crate::atmosphere::AtmosphereModel;
use crate::components::{Bodytube, Nosecone};
use crate::ecs::{EntityId, World};
use crate::error::SimError;
use crate::state::PhysicsState;
use crate::types::{self, Vector3};

/// Below this clamp the Prandtl-Glauert correction would diverge as Mach
/// approaches 1 from below; left unclamped the formula from the original
/// source is singular there. We cap it at 2.0, a generous upper bound well
/// above the subsonic/supersonic branches on either side.
const TRANSONIC_CD_CLAMP: f64 = 2.0;

struct Job {
    entity: EntityId,
}

struct AeroOutput {
    force: Vector3,
    moment: Vector3,
    angular_acceleration: Vector3,
}

pub fn step(world: &mut World, atmosphere: &AtmosphereModel, workers: usize) -> Result<(), SimError> {
    let entities: Vec<EntityId> = world.entities().collect();

    let workers = workers.max(1).min(entities.len().max(1));
    let (job_tx, job_rx) = bounded::<Job>(0);
    let (result_tx, result_rx) = bounded::<(EntityId, AeroOutput)>(entities.len().max(1));

    let world_ref: &World = world;
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    if let Some(output) = compute_entity_aero(world_ref, atmosphere, job.entity) {
                        if result_tx.send((job.entity, output)).is_err() {
                            break;
                        }
                    }
                }
            });
        }
        drop(result_tx);

        for entity in &entities {
            let _ = job_tx.send(Job { entity: *entity });
        }
        drop(job_tx);
    });

    while let Ok((entity, output)) = result_rx.recv() {
        if let Some(state) = world.get_mut::<PhysicsState>(entity) {
            state.add_force(output.force);
            state.add_moment(output.moment);
            state.angular_acceleration = output.angular_acceleration;
        }
    }

    Ok(())
}

fn reference_area(nosecone: &Nosecone, bodytube: &Bodytube) -> f64 {
    nosecone.reference_area().max(bodytube.reference_area())
}

fn drag_coefficient(mach: f64) -> f64 {
    if mach <= 0.8 {
        0.2
    } else if mach < 1.2 {
        let cd = 0.2 / (1.0 - mach * mach).abs().sqrt();
        cd.min(TRANSONIC_CD_CLAMP)
    } else {
        0.2 + 0.6 * (-0.6 * (mach - 1.2)).exp()
    }
}

fn compute_entity_aero(
    world: &World,
    atmosphere: &AtmosphereModel,
    entity: EntityId,
) -> Option<AeroOutput> {
    let state = world.get::<PhysicsState>(entity)?;
    let nosecone = world.get::<Nosecone>(entity)?;
    let bodytube = world.get::<Bodytube>(entity)?;

    let speed = types::magnitude(state.velocity);
    let altitude = state.position.y;
    let sample = atmosphere.sample(altitude);
    let a = atmosphere.speed_of_sound(altitude);
    let mach = if a > 0.0 { speed / a } else { 0.0 };

    let area = reference_area(nosecone, bodytube);
    let cd = drag_coefficient(mach);

    let force = if speed > 0.0 {
        let v_hat = types::divide_scalar(state.velocity, speed);
        types::multiply_scalar(v_hat, -0.5 * sample.density * cd * area * speed)
    } else {
        Vector3::zeros()
    };

    let moment = if speed >= 0.01 {
        let alpha = state.velocity.y.atan2(state.velocity.x);
        let c_m = -0.1 * (2.0 * alpha).sin();
        let magnitude = 0.5 * sample.density * speed * speed * area * bodytube.length_m * c_m;
        Vector3::new(0.0, magnitude, 0.0)
    } else {
        Vector3::zeros()
    };

    let inertia = (1.0 / 12.0)
        * state.mass
        * (3.0 * bodytube.radius_m * bodytube.radius_m + bodytube.length_m * bodytube.length_m);
    let angular_acceleration = if inertia > 0.0 {
        types::divide_scalar(moment, inertia)
    } else {
        Vector3::zeros()
    };

    Some(AeroOutput {
        force,
        moment,
        angular_acceleration,
    })
}
