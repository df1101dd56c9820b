use crate::lighting::DayTime;
use crate::scheduler::SpawnMode;
use crate::vehicle::VehicleArchetype;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The user-facing simulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// How the spawn scheduler triggers sources.
    pub spawn_mode: SpawnMode,
    /// The spawn interval in s.
    pub spawn_interval: f64,
    /// How long to run the simulation for, in s.
    pub duration: f64,
    /// The simulation time step in s.
    pub time_step: f64,
    /// Seeds the random number generator, for reproducible runs.
    pub seed: Option<u64>,
    pub day_time: DayTime,
    /// The all-red delay between signal groups, in s.
    pub signal_clearance: f64,
    /// The vehicle archetypes available for spawning.
    pub archetypes: Vec<VehicleArchetype>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_mode: SpawnMode::Random,
            spawn_interval: 10.0,
            duration: 10.0,
            time_step: 0.1,
            seed: None,
            day_time: DayTime::Day,
            signal_clearance: 0.0,
            archetypes: vec![VehicleArchetype::default()],
        }
    }
}

impl SimConfig {
    /// Reads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the config to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every duration is finite, and that the time step and
    /// spawn interval are positive.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("time_step", self.time_step, self.time_step > 0.0),
            ("duration", self.duration, self.duration >= 0.0),
            ("spawn_interval", self.spawn_interval, self.spawn_interval > 0.0),
            ("signal_clearance", self.signal_clearance, self.signal_clearance >= 0.0),
        ];
        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(Error::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
