//! Library error type.
//!
//! Every failure is fatal to the run that raised it: no partial history is
//! ever returned. Commands that make no sense in context (moving past the top
//! floor, opening on an empty floor) are not errors and never reach this type.

use crate::parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid building configuration: {0}")]
    Config(String),

    #[error("invalid trace: {0}")]
    Trace(String),

    #[error("malformed scenario at token {token}: {reason}")]
    Scenario { token: usize, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("agent issued {found} actions at turn {turn}, expected {expected}")]
    CommandCount {
        turn: usize,
        expected: usize,
        found: usize,
    },

    #[error("simulation cancelled before turn {turn}")]
    Cancelled { turn: usize },

    #[error("simulation already finished all {turns} turns")]
    Finished { turns: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
