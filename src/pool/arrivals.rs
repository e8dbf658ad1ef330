use super::{Customer, CustomerProcess, PoolModel};
use crate::kernel::{Context, OkProcess, Step};

use rand_distr::Distribution;
use tracing::trace;

/// Generates customers with exponentially distributed spacing for the whole simulated period.
///
/// Each arrival either spawns a [`CustomerProcess`] or, if the number of waiting customers has reached the model's
/// maximum queue length, balks: it is dropped without a trace in the statistics and is not retried.
#[derive(Debug, Default)]
pub struct ArrivalGenerator {
    arrival_due: bool,
}

impl ArrivalGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OkProcess<PoolModel> for ArrivalGenerator {
    fn resume(&mut self, model: &mut PoolModel, context: &mut Context<'_, PoolModel>) -> Step {
        let now = context.now();

        if self.arrival_due {
            if model.pool.num_waiting() < model.max_queue_length {
                let customer = Customer::new(model.next_customer_id(), now);
                model.stats.record_arrival();
                context.spawn(CustomerProcess::new(customer));
            } else {
                trace!(%now, waiting = model.pool.num_waiting(), "arrival balked");
            }
        }

        if now < model.horizon {
            self.arrival_due = true;
            Step::Suspend(model.arrival_distr.sample(&mut model.rng))
        } else {
            Step::Terminate
        }
    }
}
