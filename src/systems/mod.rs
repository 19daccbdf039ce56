//! Per-tick simulation phases, run in the fixed order the manager drives
//!: rail → physics → aero → integrator → rules.

pub mod aero;
pub mod integrator;
pub mod physics;
pub mod rules;
