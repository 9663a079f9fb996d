//! Building state mutated by the engine.

use serde::{Deserialize, Serialize};
use std::mem;

/// A passenger waiting for, or riding in, an elevator.
///
/// `id` is the generation index: floor-major, then turn, then order within
/// the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: usize,
    pub origin: usize,
    pub target_floor: usize,
    pub arrival_turn: usize,
}

impl Passenger {
    /// Turns spent in the system as seen at the end of `turn`.
    pub fn wait(&self, turn: usize) -> usize {
        turn - self.arrival_turn
    }
}

#[derive(Debug, Clone)]
pub struct Elevator {
    id: usize,
    floor: usize,
    capacity: usize,
    passengers: Vec<Passenger>,
}

impl Elevator {
    pub fn new(id: usize, capacity: usize) -> Self {
        Self {
            id,
            floor: 0,
            capacity,
            passengers: Vec::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Onboard passengers in boarding order.
    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.passengers.len()
    }

    /// Move one floor up unless already on the top floor.
    pub fn move_up(&mut self, n_floors: usize) {
        if self.floor + 1 < n_floors {
            self.floor += 1;
        }
    }

    /// Move one floor down unless already on the ground floor.
    pub fn move_down(&mut self) {
        self.floor = self.floor.saturating_sub(1);
    }

    /// Open the doors on `floor`: alight everyone bound here, then board
    /// from the front of the queue until it is empty or the car is full.
    ///
    /// Alighted passengers are appended to `delivered` in boarding order.
    pub fn exchange(&mut self, floor: &mut Floor, delivered: &mut Vec<Passenger>) {
        debug_assert_eq!(floor.index(), self.floor);

        let here = self.floor;
        let (arrived, remaining): (Vec<Passenger>, Vec<Passenger>) = mem::take(&mut self.passengers)
            .into_iter()
            .partition(|p| p.target_floor == here);
        delivered.extend(arrived);
        self.passengers = remaining;

        let n_board = self.free_space().min(floor.waiting.len());
        self.passengers.extend(floor.waiting.drain(..n_board));
    }
}

#[derive(Debug, Clone)]
pub struct Floor {
    index: usize,
    waiting: Vec<Passenger>,
}

impl Floor {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            waiting: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Queued passengers in arrival order.
    pub fn waiting(&self) -> &[Passenger] {
        &self.waiting
    }

    pub fn enqueue(&mut self, arrivals: &[Passenger]) {
        self.waiting.extend_from_slice(arrivals);
    }
}
