//! Agent-facing scenario text.
//!
//! ```text
//! N M C T λ
//! <floor 0: T groups "count target_1 .. target_count">
//! ...
//! <floor N-1>
//! ```

use crate::config::BuildingConfig;
use crate::error::{Error, Result};
use crate::traffic::Trace;
use std::fmt::Write;
use std::str::FromStr;

/// Render `trace` as scenario text.
pub fn encode(cfg: &BuildingConfig, trace: &Trace) -> String {
    let mut text = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        text,
        "{} {} {} {} {}",
        cfg.floors, cfg.elevators, cfg.capacity, cfg.turns, cfg.arrival_rate
    );

    for floor in 0..trace.n_floors() {
        for (turn, arrivals) in trace.floor(floor).iter().enumerate() {
            if turn > 0 {
                text.push(' ');
            }
            let _ = write!(text, "{}", arrivals.len());
            for p in arrivals {
                let _ = write!(text, " {}", p.target_floor);
            }
        }
        text.push('\n');
    }

    text
}

/// Read scenario text back into its configuration and trace.
pub fn decode(text: &str) -> Result<(BuildingConfig, Trace)> {
    let mut tokens = Tokens::new(text);

    let cfg = BuildingConfig {
        floors: tokens.next_num("number of floors")?,
        elevators: tokens.next_num("number of elevators")?,
        capacity: tokens.next_num("capacity")?,
        turns: tokens.next_num("number of turns")?,
        arrival_rate: tokens.next_num("arrival rate")?,
    };
    cfg.validate().map_err(|e| Error::Scenario {
        token: 0,
        reason: e.to_string(),
    })?;

    let mut trace = Trace::empty(&cfg);
    for floor in 0..cfg.floors {
        for turn in 0..cfg.turns {
            let count: usize = tokens.next_num("arrival count")?;
            for _ in 0..count {
                let token = tokens.index;
                let target_floor: usize = tokens.next_num("target floor")?;
                trace
                    .add_passenger(floor, turn, target_floor)
                    .map_err(|e| Error::Scenario {
                        token,
                        reason: e.to_string(),
                    })?;
            }
        }
    }

    if tokens.inner.next().is_some() {
        return Err(Error::Scenario {
            token: tokens.index,
            reason: "unexpected trailing tokens".to_string(),
        });
    }

    Ok((cfg, trace))
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    index: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
            index: 0,
        }
    }

    fn next_num<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.index;
        let raw = self.inner.next().ok_or_else(|| Error::Scenario {
            token,
            reason: format!("expected {what}, found end of input"),
        })?;
        self.index += 1;
        raw.parse().map_err(|_| Error::Scenario {
            token,
            reason: format!("expected {what}, found {raw:?}"),
        })
    }
}
