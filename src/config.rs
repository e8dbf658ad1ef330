use serde::{Deserialize, Serialize};

pub const DEFAULT_POOL_CAPACITY: usize = 100;
/// Five eight-hour shifts, in minutes.
pub const DEFAULT_SIM_DURATION: u32 = 5 * 8 * 60;
pub const DEFAULT_NUM_EXPERIMENTS: usize = 20;
pub const DEFAULT_MAX_QUEUE_LENGTH: usize = 30;
pub const DEFAULT_BASE_SEED: u64 = 42;

/// Parameters shared read-only by every experiment of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Maximum number of swimmers inside the pool at once.
    pub pool_capacity: usize,
    /// Length of each simulated period, in minutes.
    pub sim_duration: u32,
    /// Number of independently seeded runs.
    pub num_experiments: usize,
    /// Arrivals balk once this many customers are waiting.
    pub max_queue_length: usize,
    /// Experiment `i` (counting from 1) is seeded with `base_seed + i`.
    pub base_seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            sim_duration: DEFAULT_SIM_DURATION,
            num_experiments: DEFAULT_NUM_EXPERIMENTS,
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            base_seed: DEFAULT_BASE_SEED,
        }
    }
}

impl ExperimentConfig {
    /// Check that every count is in range before any run starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first offending parameter.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn validate(&self) -> crate::Result {
        if self.pool_capacity == 0 {
            return Err(crate::Error::Configuration("pool capacity must be positive".into()));
        }
        if self.sim_duration == 0 {
            return Err(crate::Error::Configuration("simulation duration must be positive".into()));
        }
        if self.num_experiments == 0 {
            return Err(crate::Error::Configuration("number of experiments must be positive".into()));
        }
        Ok(())
    }

    /// Seed of experiment `index`.
    pub fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert_eq!(Ok(()), config.validate());
        assert_eq!(2400, config.sim_duration);
        assert_eq!(43, config.seed_for(1));
    }

    #[test]
    fn rejects_non_positive_counts() {
        let invalid = [
            ExperimentConfig {
                pool_capacity: 0,
                ..Default::default()
            },
            ExperimentConfig {
                sim_duration: 0,
                ..Default::default()
            },
            ExperimentConfig {
                num_experiments: 0,
                ..Default::default()
            },
        ];
        for config in invalid {
            assert!(
                matches!(config.validate(), Err(crate::Error::Configuration(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn zero_queue_length_is_allowed() {
        let config = ExperimentConfig {
            max_queue_length: 0,
            ..Default::default()
        };
        assert_eq!(Ok(()), config.validate());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ExperimentConfig = serde_json::from_str(r#"{"pool_capacity": 25}"#).unwrap();
        assert_eq!(25, config.pool_capacity);
        assert_eq!(DEFAULT_SIM_DURATION, config.sim_duration);
        assert_eq!(DEFAULT_BASE_SEED, config.base_seed);
    }
}
