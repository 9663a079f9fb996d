//! Decoded elevator actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What one elevator does during one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    Stay,
    OpenAndExchange,
}

impl Action {
    /// Short token written into agent output.
    pub fn token(self) -> &'static str {
        match self {
            Action::MoveUp => "UP",
            Action::MoveDown => "DOWN",
            Action::Stay => "STAY",
            Action::OpenAndExchange => "OPEN",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// An action bound to the elevator that performs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub elevator: usize,
    pub action: Action,
}

/// A `turns × elevators` table of actions, turn-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    n_elevators: usize,
    actions: Vec<Action>,
}

impl CommandPlan {
    /// Build a plan from turn-major actions.
    ///
    /// # Panics
    /// Panics if `n_elevators` is zero or does not divide `actions.len()`.
    pub fn new(n_elevators: usize, actions: Vec<Action>) -> Self {
        assert!(n_elevators > 0, "plan needs at least one elevator");
        assert_eq!(
            actions.len() % n_elevators,
            0,
            "actions must fill whole turns"
        );
        Self {
            n_elevators,
            actions,
        }
    }

    pub fn n_elevators(&self) -> usize {
        self.n_elevators
    }

    pub fn n_turns(&self) -> usize {
        self.actions.len() / self.n_elevators
    }

    /// Actions of `turn`, indexed by elevator.
    pub fn turn(&self, turn: usize) -> &[Action] {
        let start = turn * self.n_elevators;
        &self.actions[start..start + self.n_elevators]
    }
}

/// One line per turn, one token per elevator.
impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for turn in self.actions.chunks(self.n_elevators) {
            for (i, action) in turn.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{action}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_turn_per_line() {
        let plan = CommandPlan::new(
            2,
            vec![
                Action::OpenAndExchange,
                Action::MoveUp,
                Action::Stay,
                Action::MoveDown,
            ],
        );
        assert_eq!(plan.n_turns(), 2);
        assert_eq!(plan.to_string(), "OPEN UP\nSTAY DOWN\n");
    }
}
