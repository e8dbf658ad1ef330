//! The swimming pool model: a gate that opens for one minute every hour, Poisson arrivals that balk at a long
//! queue, capacity-gated admission by one-minute polling, and a two-branch swim duration.

mod arrivals;
mod customer;
mod gate;
mod state;

pub use arrivals::ArrivalGenerator;
pub use customer::{swim_duration, Customer, CustomerProcess};
pub use gate::GateCycle;
pub use state::PoolState;

use crate::config::ExperimentConfig;
use crate::kernel::{Scheduler, VirtualTime};
use crate::stats::Statistics;

use rand::SeedableRng;
use rand_distr::Exp;
use rand_pcg::Pcg64;

/// Mean spacing of arrivals, in minutes.
pub const MEAN_INTERARRIVAL_MINUTES: f64 = 1.0;

/// Simulation state of one experiment.
///
/// Everything a run mutates lives here and is owned by exactly one [`Scheduler`]: pool counters, statistics, the
/// random-number generator and the customer id counter. Nothing is shared between experiments, so independent runs
/// can execute on separate threads and a given seed always reproduces the same run.
#[derive(Debug)]
pub struct PoolModel {
    pool: PoolState,
    stats: Statistics,
    rng: Pcg64,
    arrival_distr: Exp<f64>,
    horizon: VirtualTime,
    max_queue_length: usize,
    next_customer_id: u64,
}

impl PoolModel {
    /// Build the initial state for one run of `config`, drawing all randomness from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `config` does not validate or the arrival distribution cannot be built.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn new(config: &ExperimentConfig, seed: u64) -> crate::Result<Self> {
        config.validate()?;
        let arrival_distr = Exp::new(1.0 / MEAN_INTERARRIVAL_MINUTES)
            .map_err(|e| crate::Error::Configuration(format!("arrival distribution: {e}")))?;

        Ok(Self {
            pool: PoolState::new(config.pool_capacity),
            stats: Statistics::default(),
            rng: Pcg64::seed_from_u64(seed),
            arrival_distr,
            horizon: VirtualTime::from(config.sim_duration),
            max_queue_length: config.max_queue_length,
            next_customer_id: 1,
        })
    }

    /// Hand the model to a fresh scheduler with the arrival generator and the gate cycle spawned at time zero, in
    /// that order.
    pub fn into_scheduler(self) -> Scheduler<Self> {
        let mut scheduler = Scheduler::new(self);
        scheduler.spawn(ArrivalGenerator::new());
        scheduler.spawn(GateCycle::new());
        scheduler
    }

    fn next_customer_id(&mut self) -> u64 {
        let id = self.next_customer_id;
        self.next_customer_id += 1;
        id
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Consume the model, keeping only its statistics.
    pub fn into_stats(self) -> Statistics {
        self.stats
    }

    /// End of the simulated period.
    pub fn horizon(&self) -> VirtualTime {
        self.horizon
    }

    pub fn max_queue_length(&self) -> usize {
        self.max_queue_length
    }
}
