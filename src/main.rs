mod manager;
mod stats;

use crate::manager::{HistoryFormat, Manager, Policy};
use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write scenario text for every seed in `start..=end`.
    Generate {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
    },

    /// Write agent output from a built-in strategy.
    Baseline {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        #[arg(long, value_enum, default_value_t = Policy::Greedy)]
        policy: Policy,
    },

    /// Replay one seed's agent output and save its snapshots.
    Replay {
        #[arg(long)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = HistoryFormat::Msgpack)]
        format: HistoryFormat,
    },

    /// Score every agent output in the work directory.
    Evaluate,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.work_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Generate { start, end } => {
            ensure!(start <= end, "start seed {start} is after end seed {end}");
            mgr.generate_scenarios(start..=end)?
        }
        Command::Baseline { start, end, policy } => {
            ensure!(start <= end, "start seed {start} is after end seed {end}");
            mgr.write_baselines(start..=end, policy)?
        }
        Command::Replay { seed, format } => {
            let report = mgr.replay(seed, format)?;
            println!("Score: {}", report.final_score);
        }
        Command::Evaluate => mgr.evaluate()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
