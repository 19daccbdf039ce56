//! Flight-phase rule engine: detects liftoff, burnout, apogee,
//! parachute deploy, and landing from the post-integration state, and
//! halts the run once landing is observed.

use crate::components::Parachute;
use crate::ecs::{EntityId, World};
use crate::events::EventTag;
use crate::motor::{Motor, MotorState};
use crate::state::PhysicsState;

/// Per-run FSM flags; one instance per simulated vehicle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightPhaseFlags {
    pub had_liftoff: bool,
    pub had_burnout: bool,
    pub had_apogee: bool,
    pub had_landing: bool,
}

/// Runs the rule engine for one entity and returns the event tag emitted
/// this tick (`EventTag::None` if no transition fired). Returns `true` in
/// the second element once landing has been observed, signalling the
/// manager to halt the loop.
pub fn step(
    world: &mut World,
    flags: &mut FlightPhaseFlags,
    entity: EntityId,
    ground_tolerance: f64,
) -> (EventTag, bool) {
    let event = detect_event(world, flags, entity, ground_tolerance);

    if event == EventTag::ParachuteDeploy {
        if let Some(parachute) = world.get_mut::<Parachute>(entity) {
            parachute.deploy();
        }
    }

    if let Some(state) = world.get_mut::<PhysicsState>(entity) {
        state.last_event = event;
    }

    (event, flags.had_landing)
}

fn detect_event(
    world: &World,
    flags: &mut FlightPhaseFlags,
    entity: EntityId,
    ground_tolerance: f64,
) -> EventTag {
    let state = match world.get::<PhysicsState>(entity) {
        Some(s) => s,
        None => return EventTag::None,
    };
    let motor_state = world.get::<Motor>(entity).map(|m| m.state());

    if !flags.had_liftoff && state.position.y > ground_tolerance {
        flags.had_liftoff = true;
        return EventTag::Liftoff;
    }

    if !flags.had_burnout && motor_state == Some(MotorState::Burnout) {
        flags.had_burnout = true;
        return EventTag::Burnout;
    }

    let motor_coasting = world.get::<Motor>(entity).map(|m| m.is_coasting()).unwrap_or(true);
    if flags.had_liftoff
        && !flags.had_apogee
        && state.velocity.y <= 0.0
        && motor_coasting
        && state.position.y > ground_tolerance
    {
        flags.had_apogee = true;
        return EventTag::Apogee;
    }

    if flags.had_apogee {
        if let Some(parachute) = world.get::<Parachute>(entity) {
            if parachute.trigger == EventTag::Apogee && !parachute.is_deployed() {
                return EventTag::ParachuteDeploy;
            }
        }
    }

    if flags.had_apogee
        && !flags.had_landing
        && state.position.y <= ground_tolerance
        && state.velocity.y <= 0.0
    {
        flags.had_landing = true;
        return EventTag::Land;
    }

    EventTag::None
}
