//! Repeated, independently seeded runs of the pool model and their aggregate.

use crate::config::ExperimentConfig;
use crate::pool::PoolModel;
use crate::stats::{round2, Statistics};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::info;

/// Implementation identifier written into every summary record.
pub const FRAMEWORK: &str = "poolsim";
/// Marks the one machine-readable line of a benchmark run. Nothing else on stdout may start with it.
pub const SUMMARY_PREFIX: &str = "Summary:";

/// Result of one experiment.
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    /// Counting from 1.
    pub index: usize,
    pub seed: u64,
    /// Wall-clock time spent building and running the simulation.
    pub elapsed: Duration,
    pub stats: Statistics,
}

/// Run experiment `index` of `config` on its own scheduler, model state and random-number generator.
///
/// The same `config` and `index` always reproduce the same statistics.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for an invalid `config`, or whatever error aborted the run, such as
/// [`Error::InvariantViolation`].
///
/// [`Error::Configuration`]: crate::Error::Configuration
/// [`Error::InvariantViolation`]: crate::Error::InvariantViolation
pub fn run_experiment(config: &ExperimentConfig, index: usize) -> crate::Result<ExperimentOutcome> {
    config.validate()?;
    let seed = config.seed_for(index);

    let started = Instant::now();
    let model = PoolModel::new(config, seed)?;
    let horizon = model.horizon();
    let mut scheduler = model.into_scheduler();
    scheduler.run(horizon)?;
    let elapsed = started.elapsed();

    let stats = scheduler.into_state().into_stats();
    info!(
        experiment = index,
        seed,
        elapsed_ms = as_millis(elapsed),
        customers = stats.total_customers(),
        served = stats.served_customers(),
        "experiment finished"
    );
    stats.report(f64::from(config.sim_duration));

    Ok(ExperimentOutcome {
        index,
        seed,
        elapsed,
        stats,
    })
}

/// Run all `config.num_experiments` experiments and aggregate them.
///
/// The configuration is validated before the first run starts. Experiments run one after another, or on a rayon
/// worker pool with the `parallel` feature; either way outcomes are aggregated in index order.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for an invalid `config`, or the error of the first failing experiment. No summary
/// is produced in either case.
///
/// [`Error::Configuration`]: crate::Error::Configuration
pub fn run_experiments(config: &ExperimentConfig) -> crate::Result<ExperimentSummary> {
    config.validate()?;
    let outcomes = run_all(config)?;
    let summary = ExperimentSummary::from_outcomes(config, &outcomes);

    info!(
        experiments = summary.num_experiments,
        average_ms = summary.timing.average_ms,
        avg_customers = summary.avg_customers,
        avg_served_customers = summary.avg_served_customers,
        average_waiting_time = summary.average_waiting_time,
        throughput = summary.throughput(),
        "all experiments finished"
    );
    Ok(summary)
}

#[cfg(not(feature = "parallel"))]
fn run_all(config: &ExperimentConfig) -> crate::Result<Vec<ExperimentOutcome>> {
    (1..=config.num_experiments)
        .map(|index| run_experiment(config, index))
        .collect()
}

#[cfg(feature = "parallel")]
fn run_all(config: &ExperimentConfig) -> crate::Result<Vec<ExperimentOutcome>> {
    use rayon::prelude::*;

    (1..=config.num_experiments)
        .into_par_iter()
        .map(|index| run_experiment(config, index))
        .collect()
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1e6
}

/// Wall-clock cost of a batch of experiments, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallClock {
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_ms: f64,
}

impl WallClock {
    fn from_durations(durations: &[Duration]) -> Self {
        let millis: Vec<f64> = durations.iter().map(|d| as_millis(*d)).collect();
        if millis.is_empty() {
            return Self::default();
        }

        let total_ms: f64 = millis.iter().sum();
        Self {
            average_ms: total_ms / millis.len() as f64,
            min_ms: millis.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: millis.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total_ms,
        }
    }
}

/// Aggregate over all experiments of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSummary {
    pub pool_capacity: usize,
    pub sim_duration: u32,
    pub num_experiments: usize,
    pub timing: WallClock,
    /// Mean number of customers who joined the queue per experiment.
    pub avg_customers: f64,
    pub avg_served_customers: f64,
    /// Mean over experiments of each experiment's mean waiting time, in minutes.
    pub average_waiting_time: f64,
}

impl ExperimentSummary {
    pub fn from_outcomes(config: &ExperimentConfig, outcomes: &[ExperimentOutcome]) -> Self {
        let durations: Vec<Duration> = outcomes.iter().map(|outcome| outcome.elapsed).collect();
        let mean_of = |value: fn(&Statistics) -> f64| {
            if outcomes.is_empty() {
                0.0
            } else {
                outcomes.iter().map(|outcome| value(&outcome.stats)).sum::<f64>() / outcomes.len() as f64
            }
        };

        Self {
            pool_capacity: config.pool_capacity,
            sim_duration: config.sim_duration,
            num_experiments: outcomes.len(),
            timing: WallClock::from_durations(&durations),
            avg_customers: mean_of(|stats| stats.total_customers() as f64),
            avg_served_customers: mean_of(|stats| stats.served_customers() as f64),
            average_waiting_time: mean_of(Statistics::mean_waiting_time),
        }
    }

    /// Customers per simulated hour.
    pub fn throughput(&self) -> f64 {
        self.avg_customers / (f64::from(self.sim_duration) / 60.0)
    }

    /// The same summary with wall-clock timings zeroed, for comparing the simulated results of two batches.
    pub fn without_timing(&self) -> Self {
        Self {
            timing: WallClock::default(),
            ..self.clone()
        }
    }

    /// The flat record printed for the benchmarking harness. Timings and the waiting time are rounded to two
    /// decimals.
    pub fn record(&self) -> SummaryRecord {
        SummaryRecord {
            framework: FRAMEWORK.to_owned(),
            pool_capacity: self.pool_capacity,
            sim_duration: self.sim_duration,
            num_experiments: self.num_experiments,
            average_time: round2(self.timing.average_ms),
            min_time: round2(self.timing.min_ms),
            max_time: round2(self.timing.max_ms),
            total_time: round2(self.timing.total_ms),
            avg_customers: self.avg_customers,
            avg_served_customers: self.avg_served_customers,
            average_waiting_time: round2(self.average_waiting_time),
        }
    }
}

/// Machine-readable summary, printed as a single `Summary:{json}` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub framework: String,
    pub pool_capacity: usize,
    pub sim_duration: u32,
    pub num_experiments: usize,
    /// Milliseconds.
    pub average_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub total_time: f64,
    pub avg_customers: f64,
    pub avg_served_customers: f64,
    /// Minutes.
    pub average_waiting_time: f64,
}

impl SummaryRecord {
    /// Render the record as its output line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Summary`] if the record cannot be encoded.
    ///
    /// [`Error::Summary`]: crate::Error::Summary
    pub fn to_line(&self) -> crate::Result<String> {
        Ok(format!("{SUMMARY_PREFIX}{}", serde_json::to_string(self)?))
    }

    /// Locate the first line starting with [`SUMMARY_PREFIX`] in program output and decode it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSummary`] if there is no such line, or [`Error::Summary`] if it does not decode.
    ///
    /// [`Error::MissingSummary`]: crate::Error::MissingSummary
    /// [`Error::Summary`]: crate::Error::Summary
    pub fn find(output: &str) -> crate::Result<Self> {
        output
            .lines()
            .find(|line| line.starts_with(SUMMARY_PREFIX))
            .ok_or(crate::Error::MissingSummary)?
            .parse()
    }
}

impl FromStr for SummaryRecord {
    type Err = crate::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let json = line.strip_prefix(SUMMARY_PREFIX).ok_or(crate::Error::MissingSummary)?;
        Ok(serde_json::from_str(json.trim())?)
    }
}

impl Display for SummaryRecord {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let line = self.to_line().map_err(|_| std::fmt::Error)?;
        f.write_str(&line)
    }
}
