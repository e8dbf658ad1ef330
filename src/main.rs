use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use poolsim::config::{
    DEFAULT_BASE_SEED, DEFAULT_MAX_QUEUE_LENGTH, DEFAULT_NUM_EXPERIMENTS, DEFAULT_POOL_CAPACITY, DEFAULT_SIM_DURATION,
};
use poolsim::{run_experiments, ExperimentConfig};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Swimming pool queueing benchmark.
///
/// Runs the model repeatedly with distinct seeds and prints one `Summary:{json}` line on stdout. Diagnostics go to
/// stderr.
#[derive(Parser, Debug)]
#[command(name = "poolsim", version, about, long_about = None)]
struct Cli {
    /// Maximum number of swimmers inside the pool at once
    #[arg(long, default_value_t = DEFAULT_POOL_CAPACITY, value_parser = parse_positive)]
    pool_capacity: usize,

    /// Simulated period of each experiment, in minutes
    #[arg(long, default_value_t = DEFAULT_SIM_DURATION, value_parser = clap::value_parser!(u32).range(1..))]
    sim_duration: u32,

    /// Number of independently seeded experiments
    #[arg(long, default_value_t = DEFAULT_NUM_EXPERIMENTS, value_parser = parse_positive)]
    num_experiments: usize,

    /// Arrivals balk once this many customers are waiting
    #[arg(long, default_value_t = DEFAULT_MAX_QUEUE_LENGTH)]
    max_queue_length: usize,

    /// Experiment i is seeded with SEED + i
    #[arg(long, default_value_t = DEFAULT_BASE_SEED)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_owned()),
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(e.to_string()),
    }
}

impl From<&Cli> for ExperimentConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            pool_capacity: cli.pool_capacity,
            sim_duration: cli.sim_duration,
            num_experiments: cli.num_experiments,
            max_queue_length: cli.max_queue_length,
            base_seed: cli.seed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ExperimentConfig::from(&cli);
    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }
    tracing::info!(?config, "starting experiments");

    let summary = match run_experiments(&config) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("simulation failed: {e}");
            return ExitCode::FAILURE;
        },
    };

    match summary.record().to_line() {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("could not encode summary: {e}");
            ExitCode::FAILURE
        },
    }
}
