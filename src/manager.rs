use crate::stats::{Accumulator, AccumulatorReport};
use anyhow::{Context, Result};
use clap::ValueEnum;
use elevator_sim::agent::{self, Agent, Greedy, Idle};
use elevator_sim::{BuildingConfig, Report, Snapshot, scenario, traffic};
use glob::glob;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

/// Built-in strategy used to write baseline agent output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Policy {
    Greedy,
    Idle,
}

impl Policy {
    fn agent(self) -> Box<dyn Agent> {
        match self {
            Policy::Greedy => Box::new(Greedy),
            Policy::Idle => Box::new(Idle),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HistoryFormat {
    Msgpack,
    Json,
}

impl HistoryFormat {
    fn extension(self) -> &'static str {
        match self {
            HistoryFormat::Msgpack => "msgpack",
            HistoryFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct Failure {
    seed: u64,
    error: String,
}

#[derive(Serialize)]
struct Results {
    final_score: AccumulatorReport,
    reports: Vec<Report>,
    failures: Vec<Failure>,
}

/// Work directory layout:
///
/// ```text
/// config.toml            optional building config
/// in/SSSS.txt            scenario text per seed
/// out/SSSS.txt           agent output per seed
/// history/SSSS.<ext>     replayed snapshots per seed
/// results.json           batch evaluation
/// ```
pub struct Manager {
    work_dir: PathBuf,
    cfg: BuildingConfig,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let config_file = work_dir.join("config.toml");
        let cfg = if config_file.is_file() {
            let text = fs::read_to_string(&config_file)
                .with_context(|| format!("failed to read {config_file:?}"))?;
            BuildingConfig::from_toml_str(&text).context("failed to construct cfg")?
        } else {
            log::info!("{config_file:?} not found, using the default building");
            BuildingConfig::default()
        };
        log::info!("{cfg:#?}");

        Ok(Self { work_dir, cfg })
    }

    pub fn generate_scenarios(&self, seeds: RangeInclusive<u64>) -> Result<()> {
        let in_dir = self.in_dir();
        fs::create_dir_all(&in_dir).with_context(|| format!("failed to create {in_dir:?}"))?;

        for seed in seeds {
            let trace = traffic::generate(seed, &self.cfg)
                .with_context(|| format!("failed to generate trace for seed {seed}"))?;
            let file = self.in_file(seed);
            fs::write(&file, scenario::encode(&self.cfg, &trace))
                .with_context(|| format!("failed to write {file:?}"))?;
            log::info!("wrote {file:?} ({} passengers)", trace.n_passengers());
        }

        Ok(())
    }

    pub fn write_baselines(&self, seeds: RangeInclusive<u64>, policy: Policy) -> Result<()> {
        let out_dir = self.out_dir();
        fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {out_dir:?}"))?;

        let mut strategy = policy.agent();
        for seed in seeds {
            let trace = traffic::generate(seed, &self.cfg)
                .with_context(|| format!("failed to generate trace for seed {seed}"))?;
            let plan = agent::play(&self.cfg, &trace, &mut *strategy)
                .with_context(|| format!("failed to play {policy:?} on seed {seed}"))?;
            let file = self.out_file(seed);
            fs::write(&file, plan.to_string())
                .with_context(|| format!("failed to write {file:?}"))?;
            log::info!("wrote {file:?}");
        }

        Ok(())
    }

    pub fn replay(&self, seed: u64, format: HistoryFormat) -> Result<Report> {
        let out_file = self.out_file(seed);
        let text = fs::read_to_string(&out_file)
            .with_context(|| format!("failed to read {out_file:?}"))?;
        let history = elevator_sim::run_simulation_with(seed, &self.cfg, &text)
            .with_context(|| format!("failed to simulate seed {seed}"))?;

        let history_dir = self.history_dir();
        fs::create_dir_all(&history_dir)
            .with_context(|| format!("failed to create {history_dir:?}"))?;
        let history_file = self.history_file(seed, format);
        write_history(&history_file, &history, format)
            .with_context(|| format!("failed to write {history_file:?}"))?;

        let report = Report::new(seed, &history, self.cfg.turns);
        log::info!("{report:#?}");

        Ok(report)
    }

    pub fn evaluate(&self) -> Result<()> {
        let cases = self.list_outputs().context("failed to list agent outputs")?;
        log::info!("evaluating {} agent outputs", cases.len());

        let evaluate_case = |(seed, file): &(u64, PathBuf)| -> (u64, Result<Report>) {
            let report = fs::read_to_string(file)
                .with_context(|| format!("failed to read {file:?}"))
                .and_then(|text| {
                    elevator_sim::evaluate(*seed, &self.cfg, &text)
                        .with_context(|| format!("failed to evaluate seed {seed}"))
                });
            (*seed, report)
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<(u64, Result<Report>)> = {
            use rayon::prelude::*;
            cases.par_iter().map(evaluate_case).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<(u64, Result<Report>)> = cases.iter().map(evaluate_case).collect();

        let mut acc = Accumulator::new();
        let mut reports = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (seed, outcome) in outcomes {
            match outcome {
                Ok(report) => {
                    acc.add(report.final_score as f64);
                    reports.push(report);
                }
                Err(error) => {
                    log::warn!("{error:#}");
                    failures.push(Failure {
                        seed,
                        error: format!("{error:#}"),
                    });
                }
            }
        }

        let results = Results {
            final_score: acc.report(),
            reports,
            failures,
        };
        log::info!("{:#?}", results.final_score);

        let file = self.results_file();
        let writer = BufWriter::new(
            File::create(&file).with_context(|| format!("failed to create {file:?}"))?,
        );
        serde_json::to_writer_pretty(writer, &results).context("failed to serialize results")?;

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        for dir in [self.in_dir(), self.out_dir(), self.history_dir()] {
            if dir.is_dir() {
                fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {dir:?}"))?;
                log::info!("removed {dir:?}");
            }
        }
        let file = self.results_file();
        if file.is_file() {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    /// Agent outputs named after their seed, in ascending seed order.
    fn list_outputs(&self) -> Result<Vec<(u64, PathBuf)>> {
        let pattern = self.out_dir().join("*.txt");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;

        let mut cases = Vec::new();
        for file in glob(pattern)
            .context("failed to glob agent outputs")?
            .filter_map(Result::ok)
        {
            let seed = file
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok());
            match seed {
                Some(seed) => cases.push((seed, file)),
                None => log::warn!("skipping {file:?}: name is not a seed"),
            }
        }
        cases.sort_by_key(|&(seed, _)| seed);

        Ok(cases)
    }

    fn in_dir(&self) -> PathBuf {
        self.work_dir.join("in")
    }

    fn in_file(&self, seed: u64) -> PathBuf {
        self.in_dir().join(format!("{seed:04}.txt"))
    }

    fn out_dir(&self) -> PathBuf {
        self.work_dir.join("out")
    }

    fn out_file(&self, seed: u64) -> PathBuf {
        self.out_dir().join(format!("{seed:04}.txt"))
    }

    fn history_dir(&self) -> PathBuf {
        self.work_dir.join("history")
    }

    fn history_file(&self, seed: u64, format: HistoryFormat) -> PathBuf {
        self.history_dir()
            .join(format!("{seed:04}.{}", format.extension()))
    }

    fn results_file(&self) -> PathBuf {
        self.work_dir.join("results.json")
    }
}

fn write_history(file: &Path, history: &[Snapshot], format: HistoryFormat) -> Result<()> {
    let file = File::create(file)?;
    let mut writer = BufWriter::new(file);
    match format {
        HistoryFormat::Msgpack => {
            rmp_serde::encode::write(&mut writer, history).context("failed to serialize history")?
        }
        HistoryFormat::Json => {
            serde_json::to_writer(&mut writer, history).context("failed to serialize history")?
        }
    }
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
