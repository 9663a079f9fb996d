//! Per-turn state records and the observer hook that receives them.

use crate::model::{Elevator, Floor, Passenger};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub id: usize,
    pub origin: usize,
    pub target_floor: usize,
    pub arrival_turn: usize,
    /// `turn - arrival_turn` at the snapshot's turn.
    pub wait: usize,
}

impl PassengerRecord {
    fn new(p: &Passenger, turn: usize) -> Self {
        Self {
            id: p.id,
            origin: p.origin,
            target_floor: p.target_floor,
            arrival_turn: p.arrival_turn,
            wait: p.wait(turn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorRecord {
    pub id: usize,
    pub floor: usize,
    pub passengers: Vec<PassengerRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRecord {
    pub floor: usize,
    pub waiting: Vec<PassengerRecord>,
}

/// World state after a turn has been applied.
///
/// Owns deep copies of everything it shows, so later turns can never change
/// a snapshot that was already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: usize,
    /// Running score after this turn.
    pub score: u64,
    /// Passengers delivered so far.
    pub delivered: usize,
    pub elevators: Vec<ElevatorRecord>,
    pub floors: Vec<FloorRecord>,
}

impl Snapshot {
    pub fn record(
        turn: usize,
        elevators: &[Elevator],
        floors: &[Floor],
        score: u64,
        delivered: usize,
    ) -> Self {
        let record_all = |ps: &[Passenger]| -> Vec<PassengerRecord> {
            ps.iter().map(|p| PassengerRecord::new(p, turn)).collect()
        };

        Self {
            turn,
            score,
            delivered,
            elevators: elevators
                .iter()
                .map(|e| ElevatorRecord {
                    id: e.id(),
                    floor: e.floor(),
                    passengers: record_all(e.passengers()),
                })
                .collect(),
            floors: floors
                .iter()
                .map(|f| FloorRecord {
                    floor: f.index(),
                    waiting: record_all(f.waiting()),
                })
                .collect(),
        }
    }

    /// Every undelivered passenger: riders first (by elevator), then the
    /// floor queues (by floor).
    pub fn passengers(&self) -> impl Iterator<Item = &PassengerRecord> {
        self.elevators
            .iter()
            .flat_map(|e| &e.passengers)
            .chain(self.floors.iter().flat_map(|f| &f.waiting))
    }
}

/// Callbacks invoked by [`Engine::run_with`][crate::engine::Engine::run_with]
/// between turns.
pub trait Observer {
    /// Called with each turn's snapshot, in turn order.
    fn on_turn_end(&mut self, _snapshot: Snapshot) {}

    /// Checked before every turn. Returning `false` stops the run with
    /// [`Error::Cancelled`][crate::Error::Cancelled].
    fn keep_running(&self) -> bool {
        true
    }
}

/// An [`Observer`] that keeps the full history.
#[derive(Debug, Default)]
pub struct Recorder {
    history: Vec<Snapshot>,
}

impl Recorder {
    pub fn with_capacity(turns: usize) -> Self {
        Self {
            history: Vec::with_capacity(turns),
        }
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Snapshot> {
        self.history
    }
}

impl Observer for Recorder {
    fn on_turn_end(&mut self, snapshot: Snapshot) {
        self.history.push(snapshot);
    }
}
