//! Wait-time scoring. Lower is better.
//!
//! A passenger delivered at turn `t` costs `(t - arrival_turn + 1)²`. The
//! running score only grows on delivery, so it is non-decreasing from one
//! snapshot to the next. When the run closes, every passenger still waiting
//! or riding is charged `(T - arrival_turn)²`, as if delivered on the last
//! turn.

use crate::model::Passenger;
use crate::snapshot::{PassengerRecord, Snapshot};
use serde::{Deserialize, Serialize};

/// Cost of delivering `p` during `turn`.
pub fn delivery_cost(turn: usize, p: &Passenger) -> u64 {
    let duration = (turn - p.arrival_turn + 1) as u64;
    duration * duration
}

/// Running-score increment for the passengers delivered during `turn`.
pub fn score_delta(turn: usize, delivered: &[Passenger]) -> u64 {
    delivered.iter().map(|p| delivery_cost(turn, p)).sum()
}

/// Closing charge for a passenger never delivered within `turns` turns.
pub fn unfinished_cost(turns: usize, p: &PassengerRecord) -> u64 {
    let duration = (turns - p.arrival_turn) as u64;
    duration * duration
}

/// Running score of `last` plus the closing charge of everyone left over.
pub fn final_score(last: &Snapshot, turns: usize) -> u64 {
    let pending: u64 = last
        .passengers()
        .map(|p| unfinished_cost(turns, p))
        .sum();
    last.score + pending
}

/// Summary of one evaluated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub seed: u64,
    /// Running score after the last turn.
    pub score: u64,
    /// Running score plus the closing charge.
    pub final_score: u64,
    pub delivered: usize,
    pub undelivered: usize,
}

impl Report {
    pub fn new(seed: u64, history: &[Snapshot], turns: usize) -> Self {
        match history.last() {
            Some(last) => Self {
                seed,
                score: last.score,
                final_score: final_score(last, turns),
                delivered: last.delivered,
                undelivered: last.passengers().count(),
            },
            None => Self {
                seed,
                score: 0,
                final_score: 0,
                delivered: 0,
                undelivered: 0,
            },
        }
    }
}
