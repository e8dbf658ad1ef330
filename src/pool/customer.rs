use super::PoolModel;
use crate::kernel::{Context, Process, Step, VirtualTime};

use rand::Rng;
use tracing::debug;

/// A waiting customer re-checks admission this often, in minutes.
pub const POLL_INTERVAL_MINUTES: f64 = 1.0;
/// Share of customers who stay for roughly two hours.
pub const LONG_SWIM_PROBABILITY: f64 = 0.6;

/// One visitor of the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: u64,
    pub arrival_time: VirtualTime,
    /// Set once the customer is let in.
    pub admission_time: Option<VirtualTime>,
}

impl Customer {
    pub fn new(id: u64, arrival_time: VirtualTime) -> Self {
        Self {
            id,
            arrival_time,
            admission_time: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CustomerPhase {
    Arrived,
    Waiting,
    Inside,
}

/// Lifecycle of one customer: arrive, wait for admission, swim, leave.
///
/// Admission is polled. A customer who cannot enter on arrival re-checks every [`POLL_INTERVAL_MINUTES`], so the
/// recorded waiting time is always a whole number of minutes even if the gate opens or a place frees up in between.
#[derive(Debug)]
pub struct CustomerProcess {
    customer: Customer,
    phase: CustomerPhase,
}

impl CustomerProcess {
    pub fn new(customer: Customer) -> Self {
        Self {
            customer,
            phase: CustomerPhase::Arrived,
        }
    }

    /// Enter the pool if the gate lets us in, otherwise poll again later.
    fn try_enter(&mut self, model: &mut PoolModel, now: VirtualTime) -> crate::Result<Step> {
        if !model.pool.can_enter() {
            return Ok(Step::Suspend(POLL_INTERVAL_MINUTES));
        }

        model.pool.leave_queue(now)?;
        model.stats.record_wait(now - self.customer.arrival_time);
        model.pool.add_swimmer(now)?;
        model.stats.observe_occupancy(model.pool.num_inside());
        self.customer.admission_time = Some(now);
        self.phase = CustomerPhase::Inside;
        debug!(%now, customer = self.customer.id, inside = model.pool.num_inside(), "customer enters the pool");

        Ok(Step::Suspend(swim_duration(&mut model.rng)))
    }
}

impl Process<PoolModel> for CustomerProcess {
    fn resume(&mut self, model: &mut PoolModel, context: &mut Context<'_, PoolModel>) -> crate::Result<Step> {
        let now = context.now();
        match self.phase {
            CustomerPhase::Arrived => {
                model.pool.join_queue();
                debug!(
                    %now,
                    customer = self.customer.id,
                    waiting = model.pool.num_waiting(),
                    inside = model.pool.num_inside(),
                    "customer arrives"
                );
                self.phase = CustomerPhase::Waiting;
                self.try_enter(model, now)
            },
            CustomerPhase::Waiting => self.try_enter(model, now),
            CustomerPhase::Inside => {
                model.pool.remove_swimmer(now)?;
                let admitted = self.customer.admission_time.unwrap_or(now);
                model.stats.record_departure(now - admitted);
                debug!(%now, customer = self.customer.id, inside = model.pool.num_inside(), "customer leaves the pool");
                Ok(Step::Terminate)
            },
        }
    }
}

/// Draw how long an admitted customer swims: with probability [`LONG_SWIM_PROBABILITY`] uniformly within
/// `[115, 125]` minutes, otherwise uniformly within `[75, 120]` minutes.
pub fn swim_duration<R>(rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    if rng.random::<f64>() <= LONG_SWIM_PROBABILITY {
        rng.random_range(115.0..=125.0)
    } else {
        rng.random_range(75.0..=120.0)
    }
}
