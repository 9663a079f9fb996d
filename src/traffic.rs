//! Seeded passenger-arrival traces.
//!
//! Every floor draws from its own ChaCha12 stream (same key, stream index =
//! floor), turns in ascending order. Arrivals already drawn for a turn never
//! depend on how many turns follow it, and the trace is identical on every
//! platform for a given `(seed, config)`.

use crate::config::BuildingConfig;
use crate::error::{Error, Result};
use crate::model::Passenger;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Poisson, Uniform};

/// Full arrival schedule for a run, indexed `[floor][turn]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    arrivals: Vec<Vec<Vec<Passenger>>>,
    n_passengers: usize,
}

impl Trace {
    /// A trace with no arrivals, shaped for `cfg`.
    pub fn empty(cfg: &BuildingConfig) -> Self {
        Self {
            arrivals: vec![vec![Vec::new(); cfg.turns]; cfg.floors],
            n_passengers: 0,
        }
    }

    /// Append a passenger arriving on `floor` at `turn`.
    ///
    /// The passenger's id is the number of passengers added before it.
    pub fn add_passenger(&mut self, floor: usize, turn: usize, target_floor: usize) -> Result<()> {
        let n_floors = self.n_floors();
        let n_turns = self.n_turns();
        if floor >= n_floors || target_floor >= n_floors {
            return Err(Error::Trace(format!(
                "floors must be below {n_floors}, got {floor} -> {target_floor}"
            )));
        }
        if floor == target_floor {
            return Err(Error::Trace(format!(
                "passenger on floor {floor} cannot target its own floor"
            )));
        }
        if turn >= n_turns {
            return Err(Error::Trace(format!(
                "turn must be below {n_turns}, but is {turn}"
            )));
        }

        self.arrivals[floor][turn].push(Passenger {
            id: self.n_passengers,
            origin: floor,
            target_floor,
            arrival_turn: turn,
        });
        self.n_passengers += 1;
        Ok(())
    }

    pub fn n_floors(&self) -> usize {
        self.arrivals.len()
    }

    pub fn n_turns(&self) -> usize {
        self.arrivals.first().map_or(0, Vec::len)
    }

    pub fn n_passengers(&self) -> usize {
        self.n_passengers
    }

    /// Passengers appearing on `floor` at the start of `turn`, in generation order.
    pub fn arrivals(&self, floor: usize, turn: usize) -> &[Passenger] {
        &self.arrivals[floor][turn]
    }

    /// Per-turn arrival lists of one floor.
    pub fn floor(&self, floor: usize) -> &[Vec<Passenger>] {
        &self.arrivals[floor]
    }
}

/// Generate the arrival trace for `seed`.
///
/// For each turn a floor receives `Poisson(λ)` passengers. Each target is
/// drawn uniformly from the other `N - 1` floors with a single draw.
pub fn generate(seed: u64, cfg: &BuildingConfig) -> Result<Trace> {
    cfg.validate()?;

    let arrival_dist = if cfg.arrival_rate > 0.0 {
        let dist = Poisson::new(cfg.arrival_rate)
            .map_err(|e| Error::Config(format!("invalid arrival rate: {e}")))?;
        Some(dist)
    } else {
        None
    };
    let target_dist = Uniform::new(0, cfg.floors - 1)
        .map_err(|e| Error::Config(format!("invalid number of floors: {e}")))?;

    let mut trace = Trace::empty(cfg);
    for floor in 0..cfg.floors {
        let mut rng = floor_rng(seed, floor);
        for turn in 0..cfg.turns {
            let count = match &arrival_dist {
                Some(dist) => dist.sample(&mut rng) as usize,
                None => 0,
            };
            for _ in 0..count {
                // Skip over the origin so the target never equals it.
                let draw = target_dist.sample(&mut rng);
                let target_floor = if draw >= floor { draw + 1 } else { draw };
                trace.add_passenger(floor, turn, target_floor)?;
            }
        }
    }

    log::debug!(
        "generated {} passengers for seed {seed}",
        trace.n_passengers()
    );

    Ok(trace)
}

fn floor_rng(seed: u64, floor: usize) -> ChaCha12Rng {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    rng.set_stream(floor as u64);
    rng
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_trace() {
        let cfg = BuildingConfig::default();
        let a = generate(7, &cfg).unwrap();
        let b = generate(7, &cfg).unwrap();
        assert_eq!(a, b);
        assert!(a.n_passengers() > 0);
    }

    #[test]
    fn different_seeds_differ() {
        let cfg = BuildingConfig::default();
        assert_ne!(generate(1, &cfg).unwrap(), generate(2, &cfg).unwrap());
    }

    #[test]
    fn targets_never_equal_origin() {
        let cfg = BuildingConfig {
            floors: 2,
            arrival_rate: 1.0,
            ..Default::default()
        };
        let trace = generate(3, &cfg).unwrap();
        for floor in 0..cfg.floors {
            for arrivals in trace.floor(floor) {
                for p in arrivals {
                    assert_eq!(p.origin, floor);
                    assert_ne!(p.target_floor, floor);
                    assert!(p.target_floor < cfg.floors);
                }
            }
        }
    }

    #[test]
    fn shorter_runs_are_prefixes() {
        let long = BuildingConfig::default();
        let short = BuildingConfig {
            turns: 40,
            ..long.clone()
        };
        let long_trace = generate(11, &long).unwrap();
        let short_trace = generate(11, &short).unwrap();
        for floor in 0..long.floors {
            for turn in 0..short.turns {
                let targets = |t: &Trace| -> Vec<usize> {
                    t.arrivals(floor, turn).iter().map(|p| p.target_floor).collect()
                };
                assert_eq!(targets(&long_trace), targets(&short_trace));
            }
        }
    }

    #[test]
    fn ids_follow_generation_order() {
        let trace = generate(5, &BuildingConfig::default()).unwrap();
        let ids: Vec<usize> = (0..trace.n_floors())
            .flat_map(|f| trace.floor(f).iter().flatten().map(|p| p.id))
            .collect();
        let expected: Vec<usize> = (0..trace.n_passengers()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn zero_rate_is_empty() {
        let cfg = BuildingConfig {
            arrival_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(generate(9, &cfg).unwrap().n_passengers(), 0);
    }

    #[test]
    fn rejects_invalid_passengers() {
        let cfg = BuildingConfig {
            floors: 3,
            turns: 2,
            ..Default::default()
        };
        let mut trace = Trace::empty(&cfg);
        assert!(trace.add_passenger(1, 0, 1).is_err());
        assert!(trace.add_passenger(0, 0, 3).is_err());
        assert!(trace.add_passenger(0, 2, 1).is_err());
        assert!(trace.add_passenger(0, 1, 2).is_ok());
        assert_eq!(trace.n_passengers(), 1);
    }
}
