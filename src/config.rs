use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, ops::RangeBounds};

/// Building parameters shared by scenario generation and simulation.
///
/// Validated once and never mutated afterwards.
/// See [`BuildingConfig::from_toml_str`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingConfig {
    /// Number of floors (`N`).
    pub floors: usize,
    /// Number of elevators (`M`).
    pub elevators: usize,
    /// Passengers an elevator can hold (`C`).
    pub capacity: usize,
    /// Number of turns simulated (`T`).
    pub turns: usize,

    /// Expected number of new passengers per floor per turn (`λ`).
    pub arrival_rate: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            floors: 10,
            elevators: 3,
            capacity: 10,
            turns: 100,
            arrival_rate: 0.1,
        }
    }
}

impl BuildingConfig {
    /// Parse a [`BuildingConfig`] from TOML text.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the text cannot be deserialized
    /// or if the configuration values are invalid.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: BuildingConfig =
            toml::from_str(text).map_err(|e| Error::Config(format!("failed to parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        check_num("floors", self.floors, 2..=100)?;
        check_num("elevators", self.elevators, 1..=100)?;
        check_num("capacity", self.capacity, 1..=1_000)?;
        check_num("turns", self.turns, 1..=10_000)?;
        check_num("arrival_rate", self.arrival_rate, 0.0..=1.0)?;
        Ok(())
    }
}

fn check_num<T, R>(name: &str, num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    // NaN fails `contains`, so it is rejected here as well.
    if !range.contains(&num) {
        return Err(Error::Config(format!(
            "{name} must be in the range {range:?}, but is {num:?}"
        )));
    }
    Ok(())
}
