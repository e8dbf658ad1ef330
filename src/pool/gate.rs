use super::PoolModel;
use crate::kernel::{Context, OkProcess, Step};

use tracing::debug;

/// How long the gate stays open at the top of each hour.
pub const OPEN_MINUTES: f64 = 1.0;
/// How long the gate stays closed afterwards.
pub const CLOSED_MINUTES: f64 = 59.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum GatePhase {
    Opening,
    Closing,
}

/// Opens the gate for [`OPEN_MINUTES`], closes it for [`CLOSED_MINUTES`], and repeats.
///
/// The gate is therefore open during `[0, 1)`, `[60, 61)`, `[120, 121)` and so on. The cycle stops once its next
/// transition would fall at or after the end of the simulated period.
#[derive(Debug)]
pub struct GateCycle {
    phase: GatePhase,
}

impl GateCycle {
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Opening,
        }
    }
}

impl Default for GateCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl OkProcess<PoolModel> for GateCycle {
    fn resume(&mut self, model: &mut PoolModel, context: &mut Context<'_, PoolModel>) -> Step {
        let now = context.now();
        let (open, hold, next_phase) = match self.phase {
            GatePhase::Opening => (true, OPEN_MINUTES, GatePhase::Closing),
            GatePhase::Closing => (false, CLOSED_MINUTES, GatePhase::Opening),
        };

        model.pool.set_gate_open(open);
        debug!(%now, "gate {}", if open { "open" } else { "closed" });

        if now + hold >= model.horizon {
            Step::Terminate
        } else {
            self.phase = next_phase;
            Step::Suspend(hold)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use crate::kernel::{RunStatus, Scheduler};

    use std::cell::RefCell;
    use std::rc::Rc;

    /// Samples the gate in the middle of every minute.
    #[derive(Debug)]
    struct GateProbe {
        samples: Rc<RefCell<Vec<(f64, bool)>>>,
    }

    impl OkProcess<PoolModel> for GateProbe {
        fn resume(&mut self, model: &mut PoolModel, context: &mut Context<'_, PoolModel>) -> Step {
            self.samples
                .borrow_mut()
                .push((context.now().as_minutes(), model.pool().gate_open()));
            Step::Suspend(1.0)
        }
    }

    fn sample_gate(sim_duration: u32) -> (Scheduler<PoolModel>, Vec<(f64, bool)>) {
        let config = ExperimentConfig {
            sim_duration,
            ..ExperimentConfig::default()
        };
        let model = PoolModel::new(&config, 42).unwrap();
        let horizon = model.horizon();
        let samples = Rc::new(RefCell::new(Vec::new()));

        let mut sim = Scheduler::new(model);
        let gate = sim.spawn(GateCycle::new());
        sim.spawn_after(
            0.5,
            GateProbe {
                samples: Rc::clone(&samples),
            },
        )
        .unwrap();
        assert_eq!(RunStatus::Halted, sim.run(horizon).unwrap());
        assert_eq!(
            Some(crate::kernel::ProcessState::Terminated),
            sim.process_state(gate),
            "gate cycle should stop before the horizon"
        );

        let samples = samples.borrow().clone();
        (sim, samples)
    }

    #[test]
    fn gate_is_open_only_in_first_minute_of_each_hour() {
        let (_, samples) = sample_gate(180);
        assert_eq!(180, samples.len());

        for (time, open) in samples {
            let minute = time.floor() as u64;
            assert_eq!(minute % 60 == 0, open, "unexpected gate state at t={time}");
        }
    }

    #[test]
    fn gate_cycle_stops_mid_hour_horizon() {
        let (sim, samples) = sample_gate(90);
        assert_eq!(90, samples.len());
        assert!(samples.iter().filter(|(_, open)| *open).count() == 2);
        assert!(!sim.state().pool().gate_open(), "gate should remain closed after t=61");
    }
}
