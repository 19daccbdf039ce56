//! Tabulated thrust curve and motor state machine.
//!
//! The curve-lookup shape (binary search for the bracketing sample pair,
//! then linear interpolation) folds the lookup directly into `Motor` rather
//! than keeping it as free functions, since this engine only ever
//! interpolates one curve (thrust vs. time).

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Idle,
    Burning,
    Burnout,
}

impl MotorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorState::Idle => "IDLE",
            MotorState::Burning => "IGNITED",
            MotorState::Burnout => "BURNOUT",
        }
    }
}

/// A strictly-increasing-time (t, thrust) sample sequence spanning
/// `[0, burn_time]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrustCurve {
    times: Vec<f64>,
    thrusts: Vec<f64>,
}

impl ThrustCurve {
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, SimError> {
        if points.is_empty() {
            return Err(SimError::MotorCurveInvalid("thrust curve is empty".into()));
        }
        if points[0].0 != 0.0 {
            return Err(SimError::MotorCurveInvalid(
                "thrust curve must start at t=0".into(),
            ));
        }
        for window in points.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(SimError::MotorCurveInvalid(
                    "thrust curve time values must strictly increase".into(),
                ));
            }
        }

        let times = points.iter().map(|p| p.0).collect();
        let thrusts = points.iter().map(|p| p.1).collect();
        Ok(Self { times, thrusts })
    }

    pub fn burn_time(&self) -> f64 {
        *self.times.last().unwrap_or(&0.0)
    }

    /// Linear interpolation clamped to 0 outside `[0, burn_time]`.
    pub fn thrust_at(&self, t: f64) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        if t <= 0.0 || t >= self.burn_time() {
            return 0.0;
        }

        let idx = match self
            .times
            .binary_search_by(|probe| probe.partial_cmp(&t).unwrap())
        {
            Ok(i) => return self.thrusts[i],
            Err(i) => i,
        };
        let i0 = idx.saturating_sub(1);
        let i1 = idx.min(self.times.len() - 1);
        if i0 == i1 {
            return self.thrusts[i0];
        }

        let (t0, t1) = (self.times[i0], self.times[i1]);
        let (y0, y1) = (self.thrusts[i0], self.thrusts[i1]);
        let frac = (t - t0) / (t1 - t0);
        y0 + (y1 - y0) * frac
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotorProperties {
    pub propellant_mass_kg: f64,
    pub total_impulse_ns: f64,
    pub burn_time_s: f64,
    pub max_thrust_n: f64,
}

/// A solid-motor component: a static thrust curve plus static properties,
/// and the live finite-state machine (idle → burning → burnout) tracked per
/// tick.
#[derive(Debug)]
pub struct Motor {
    curve: ThrustCurve,
    properties: MotorProperties,
    state: MotorState,
    ignition_offset_s: Option<f64>,
    elapsed_burn_s: f64,
    warned_empty_curve: AtomicBool,
}

/// `AtomicBool` isn't `Clone`; the one-shot warning flag is carried over
/// as-is rather than reset, so a cloned motor doesn't re-warn.
impl Clone for Motor {
    fn clone(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            properties: self.properties,
            state: self.state,
            ignition_offset_s: self.ignition_offset_s,
            elapsed_burn_s: self.elapsed_burn_s,
            warned_empty_curve: AtomicBool::new(self.warned_empty_curve.load(Ordering::Relaxed)),
        }
    }
}

impl Motor {
    pub fn new(curve: ThrustCurve, properties: MotorProperties) -> Self {
        Self {
            curve,
            properties,
            state: MotorState::Idle,
            ignition_offset_s: None,
            elapsed_burn_s: 0.0,
            warned_empty_curve: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn properties(&self) -> &MotorProperties {
        &self.properties
    }

    /// idle → burning. Fails if the motor is not idle.
    pub fn ignite(&mut self, sim_time: f64) -> Result<(), SimError> {
        if self.state != MotorState::Idle {
            return Err(SimError::MotorNotIdle);
        }
        self.state = MotorState::Burning;
        self.ignition_offset_s = Some(sim_time);
        Ok(())
    }

    /// Advances the internal burn clock; transitions burning → burnout once
    /// elapsed time reaches the curve's burn time.
    pub fn update(&mut self, dt: f64) {
        if self.state != MotorState::Burning {
            return;
        }
        self.elapsed_burn_s += dt;
        if self.elapsed_burn_s >= self.curve.burn_time() {
            self.state = MotorState::Burnout;
        }
    }

    pub fn get_thrust(&self) -> f64 {
        if self.state != MotorState::Burning {
            return 0.0;
        }
        if self.curve.times.is_empty() {
            if !self.warned_empty_curve.swap(true, Ordering::Relaxed) {
                warn!("motor thrust curve is empty; returning 0 thrust for the remainder of the run");
            }
            return 0.0;
        }
        self.curve.thrust_at(self.elapsed_burn_s)
    }

    /// Propellant mass remaining, linear in elapsed burn time, floored at 0.
    pub fn get_mass(&self) -> f64 {
        let burn_time = self.curve.burn_time();
        if burn_time <= 0.0 {
            return 0.0;
        }
        let fraction_burned = (self.elapsed_burn_s / burn_time).clamp(0.0, 1.0);
        (self.properties.propellant_mass_kg * (1.0 - fraction_burned)).max(0.0)
    }

    /// Read-only thrust lookup, kept as a separate name for call sites that
    /// read thrust without driving the state machine (snapshots, the
    /// physics worker pool's immutable entity borrows).
    pub fn thrust_now(&self) -> f64 {
        self.get_thrust()
    }

    pub fn is_coasting(&self) -> bool {
        self.state != MotorState::Burning
    }

    pub fn elapsed_burn_s(&self) -> f64 {
        self.elapsed_burn_s
    }
}
