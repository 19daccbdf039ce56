//! Parasite persistence sinks: three CSV writers, each on its
//! own OS thread, fed from bounded `crossbeam_channel`s so the manager's
//! fan-out applies back-pressure and guarantees strict tick ordering.
//!
//! CSV writing uses `csv::Writer::from_path` / `writer.serialize`; fields
//! are formatted to fixed 6-decimal strings before serialization since
//! `csv`'s default `f64` formatting does not guarantee a fixed precision.

use std::path::Path;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::warn;
use serde::Serialize;

use crate::error::SimError;
use crate::events::EventTag;
use crate::types::{Quaternion, Vector3};

/// Minimum bounded-channel capacity.
pub const MIN_SINK_CAPACITY: usize = 10;

/// A post-integration per-tick snapshot, the unit all three sinks consume.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub time: f64,
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub orientation: Quaternion,
    pub thrust: f64,
    pub event: EventTag,
    pub motor_status: &'static str,
    pub parachute_status: &'static str,
}

impl StateSnapshot {
    fn is_complete(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.acceleration.iter().all(|v| v.is_finite())
            && self.orientation.as_vector().iter().all(|v| v.is_finite())
            && self.thrust.is_finite()
    }
}

fn fixed6(v: f64) -> String {
    format!("{v:.6}")
}

#[derive(Serialize)]
struct MotionRow {
    time: String,
    altitude: String,
    velocity: String,
    acceleration: String,
    thrust: String,
}

#[derive(Serialize)]
struct DynamicsRow {
    time: String,
    px: String,
    py: String,
    pz: String,
    vx: String,
    vy: String,
    vz: String,
    ax: String,
    ay: String,
    az: String,
    qx: String,
    qy: String,
    qz: String,
    qw: String,
}

#[derive(Serialize)]
struct EventsRow {
    time: String,
    event_name: String,
    motor_status: String,
    parachute_status: String,
}

/// Spawns the three sink threads, returning the senders the manager fans
/// snapshots out to each tick, plus join handles to await at shutdown.
///
/// `done` is a zero-capacity channel whose sender the manager closes (by
/// dropping it) to request prompt termination: each sink `select!`s on its
/// data channel and `done`, so a close propagates even mid-run.
pub fn spawn_sinks(
    motion_path: &Path,
    dynamics_path: &Path,
    events_path: &Path,
    capacity: usize,
) -> Result<SinkHandles, SimError> {
    let capacity = capacity.max(MIN_SINK_CAPACITY);

    let (motion_tx, motion_rx) = crossbeam_channel::bounded(capacity);
    let (dynamics_tx, dynamics_rx) = crossbeam_channel::bounded(capacity);
    let (events_tx, events_rx) = crossbeam_channel::bounded(capacity);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);

    let motion_writer = csv::Writer::from_path(motion_path).map_err(|source| SimError::SinkWriteFailed {
        sink: "motion",
        source,
    })?;
    let dynamics_writer =
        csv::Writer::from_path(dynamics_path).map_err(|source| SimError::SinkWriteFailed {
            sink: "dynamics",
            source,
        })?;
    let events_writer = csv::Writer::from_path(events_path).map_err(|source| SimError::SinkWriteFailed {
        sink: "events",
        source,
    })?;

    let motion_join = spawn_motion_sink(motion_writer, motion_rx, done_rx.clone());
    let dynamics_join = spawn_dynamics_sink(dynamics_writer, dynamics_rx, done_rx.clone());
    let events_join = spawn_events_sink(events_writer, events_rx, done_rx);

    Ok(SinkHandles {
        motion_tx,
        dynamics_tx,
        events_tx,
        done_tx,
        joins: vec![motion_join, dynamics_join, events_join],
    })
}

/// Handles the manager holds for the lifetime of a run.
pub struct SinkHandles {
    pub motion_tx: Sender<StateSnapshot>,
    pub dynamics_tx: Sender<StateSnapshot>,
    pub events_tx: Sender<StateSnapshot>,
    done_tx: Sender<()>,
    joins: Vec<JoinHandle<()>>,
}

impl SinkHandles {
    /// Sends one snapshot to every sink, blocking on each bounded channel
    /// until accepted. Because the manager waits here before advancing to
    /// the next tick, every sink observes ticks in strict order.
    pub fn fan_out(&self, snapshot: &StateSnapshot) {
        let _ = self.motion_tx.send(snapshot.clone());
        let _ = self.dynamics_tx.send(snapshot.clone());
        let _ = self.events_tx.send(snapshot.clone());
    }

    /// Drops every sender and the `done` signal, then joins all sink
    /// threads so their CSV writers flush before the run returns.
    pub fn close(self) {
        drop(self.motion_tx);
        drop(self.dynamics_tx);
        drop(self.events_tx);
        drop(self.done_tx);
        for join in self.joins {
            let _ = join.join();
        }
    }
}

fn spawn_motion_sink(
    mut writer: csv::Writer<std::fs::File>,
    rx: Receiver<StateSnapshot>,
    done: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            crossbeam_channel::select! {
                recv(rx) -> msg => match msg {
                    Ok(snapshot) => {
                        if !snapshot.is_complete() {
                            warn!("motion sink: dropping partial snapshot at t={:.6}", snapshot.time);
                            continue;
                        }
                        let row = MotionRow {
                            time: fixed6(snapshot.time),
                            altitude: fixed6(snapshot.position.y),
                            velocity: fixed6(snapshot.velocity.y),
                            acceleration: fixed6(snapshot.acceleration.y),
                            thrust: fixed6(snapshot.thrust),
                        };
                        if let Err(e) = writer.serialize(row) {
                            warn!("motion sink write failed: {e}");
                        }
                    }
                    Err(_) => break,
                },
                recv(done) -> _ => break,
            }
        }
        let _ = writer.flush();
    })
}

fn spawn_dynamics_sink(
    mut writer: csv::Writer<std::fs::File>,
    rx: Receiver<StateSnapshot>,
    done: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            crossbeam_channel::select! {
                recv(rx) -> msg => match msg {
                    Ok(snapshot) => {
                        if !snapshot.is_complete() {
                            warn!("dynamics sink: dropping partial snapshot at t={:.6}", snapshot.time);
                            continue;
                        }
                        let q = snapshot.orientation.as_vector();
                        let row = DynamicsRow {
                            time: fixed6(snapshot.time),
                            px: fixed6(snapshot.position.x),
                            py: fixed6(snapshot.position.y),
                            pz: fixed6(snapshot.position.z),
                            vx: fixed6(snapshot.velocity.x),
                            vy: fixed6(snapshot.velocity.y),
                            vz: fixed6(snapshot.velocity.z),
                            ax: fixed6(snapshot.acceleration.x),
                            ay: fixed6(snapshot.acceleration.y),
                            az: fixed6(snapshot.acceleration.z),
                            qx: fixed6(q.x),
                            qy: fixed6(q.y),
                            qz: fixed6(q.z),
                            qw: fixed6(q.w),
                        };
                        if let Err(e) = writer.serialize(row) {
                            warn!("dynamics sink write failed: {e}");
                        }
                    }
                    Err(_) => break,
                },
                recv(done) -> _ => break,
            }
        }
        let _ = writer.flush();
    })
}

fn spawn_events_sink(
    mut writer: csv::Writer<std::fs::File>,
    rx: Receiver<StateSnapshot>,
    done: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            crossbeam_channel::select! {
                recv(rx) -> msg => match msg {
                    Ok(snapshot) => {
                        if snapshot.event == EventTag::None {
                            continue;
                        }
                        let row = EventsRow {
                            time: fixed6(snapshot.time),
                            event_name: snapshot.event.as_str().to_string(),
                            motor_status: snapshot.motor_status.to_string(),
                            parachute_status: snapshot.parachute_status.to_string(),
                        };
                        if let Err(e) = writer.serialize(row) {
                            warn!("events sink write failed: {e}");
                        }
                    }
                    Err(_) => break,
                },
                recv(done) -> _ => break,
            }
        }
        let _ = writer.flush();
    })
}
