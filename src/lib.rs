//! `elevator-sim`: a deterministic judge for elevator-control agents.
//!
//! A seed and a [`BuildingConfig`] fully determine a passenger-arrival
//! [`Trace`]. Agents read the trace as scenario text and answer with one
//! action per elevator per turn. The engine replays that answer and records
//! one [`Snapshot`] per turn for external playback.
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`config`]   | `BuildingConfig` and its validation                     |
//! | [`traffic`]  | `Trace`, seeded arrival generation                      |
//! | [`scenario`] | Scenario text encoding and decoding                     |
//! | [`parser`]   | Agent output parsing, `ParseError`                      |
//! | [`command`]  | `Action`, `Command`, `CommandPlan`                      |
//! | [`engine`]   | `Engine`, the turn loop                                 |
//! | [`agent`]    | `Agent` trait, scripted and baseline strategies         |
//! | [`score`]    | Wait-time scoring, `Report`                             |
//! | [`snapshot`] | `Snapshot` records, `Observer`, `Recorder`              |
//!
//! Both entry points re-derive the trace from the seed on every call, so a
//! scenario handed to an agent and the run that judges it always agree.

pub mod agent;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod scenario;
pub mod score;
pub mod snapshot;
pub mod traffic;

pub use command::{Action, Command, CommandPlan};
pub use config::BuildingConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use parser::{ParseError, ParseErrorKind, Position};
pub use score::Report;
pub use snapshot::Snapshot;
pub use traffic::Trace;

/// Scenario text for `seed` in the default building.
pub fn generate_scenario(seed: u64) -> Result<String> {
    generate_scenario_with(seed, &BuildingConfig::default())
}

pub fn generate_scenario_with(seed: u64, cfg: &BuildingConfig) -> Result<String> {
    let trace = traffic::generate(seed, cfg)?;
    Ok(scenario::encode(cfg, &trace))
}

/// Judge `agent_output` against the default building's scenario for `seed`.
pub fn run_simulation(seed: u64, agent_output: &str) -> Result<Vec<Snapshot>> {
    run_simulation_with(seed, &BuildingConfig::default(), agent_output)
}

pub fn run_simulation_with(
    seed: u64,
    cfg: &BuildingConfig,
    agent_output: &str,
) -> Result<Vec<Snapshot>> {
    let trace = traffic::generate(seed, cfg)?;
    let plan = parser::parse(agent_output, cfg)?;
    engine::run(cfg, &trace, &plan)
}

/// Judge `agent_output` and summarize the run.
pub fn evaluate(seed: u64, cfg: &BuildingConfig, agent_output: &str) -> Result<Report> {
    let history = run_simulation_with(seed, cfg, agent_output)?;
    Ok(Report::new(seed, &history, cfg.turns))
}
