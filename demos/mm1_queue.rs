//! An M/M/1 queue that prints arrival and service logs to stdout. Arrival times are distributed with a mean spacing of
//! thirty minutes, and service times with a mean of twenty minutes.
//!
//! The simulation runs for nine hours before terminating, and so could represent a small, service-oriented business's
//! typical workday.
//!
//! Every customer is its own process. On arrival it asks for the single counter. If the counter is busy the customer
//! passivates until the one being served hands the counter over on departure.

use poolsim::kernel::{Context, OkProcess, Process, ProcessId, Resource, Scheduler, Step, VirtualTime};
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;

const WORKDAY_MINUTES: u32 = 540;

/// The counter, and the random-number generator from which arrival and service times are drawn.
#[derive(Debug)]
struct Store {
    counter: Resource,
    arrivals: Exp<f64>,
    services: Exp<f64>,
    rng: Pcg64,
    served: usize,
}

impl Store {
    fn new(seed: u64) -> poolsim::Result<Self> {
        let rate = |mean: f64| Exp::new(1.0 / mean).map_err(|e| poolsim::Error::Configuration(e.to_string()));
        Ok(Self {
            counter: Resource::new(1)?,
            arrivals: rate(30.0)?,
            services: rate(20.0)?,
            rng: Pcg64::seed_from_u64(seed),
            served: 0,
        })
    }
}

/// Sends in a new customer after every exponentially distributed gap.
#[derive(Debug)]
struct Door {
    next: usize,
}

impl OkProcess<Store> for Door {
    fn resume(&mut self, store: &mut Store, context: &mut Context<'_, Store>) -> Step {
        if self.next > 0 {
            context.spawn(Shopper::Arriving(self.next));
        }
        self.next += 1;
        Step::Suspend(store.arrivals.sample(&mut store.rng))
    }
}

#[derive(Debug)]
enum Shopper {
    Arriving(usize),
    Queued(usize),
    AtCounter(usize),
}

impl Shopper {
    fn serve(store: &mut Store, number: usize, now: VirtualTime) -> (Self, Step) {
        println!("[{now}] customer {number} moves to the counter.");
        (Shopper::AtCounter(number), Step::Suspend(store.services.sample(&mut store.rng)))
    }
}

impl Process<Store> for Shopper {
    fn resume(&mut self, store: &mut Store, context: &mut Context<'_, Store>) -> poolsim::Result<Step> {
        let now = context.now();
        let (next, step) = match *self {
            Shopper::Arriving(number) => {
                if store.counter.try_acquire(context.id()) {
                    Shopper::serve(store, number, now)
                } else {
                    println!(
                        "[{now}] customer {number} gets in line behind {} others.",
                        store.counter.waiting() - 1
                    );
                    (Shopper::Queued(number), Step::Passivate)
                }
            },
            // the counter was handed over on release
            Shopper::Queued(number) => Shopper::serve(store, number, now),
            Shopper::AtCounter(number) => {
                store.served += 1;
                println!("[{now}] customer {number} leaves. {} remain in line.", store.counter.waiting());
                if let Some(waiter) = store.counter.release(now)? {
                    context.activate(waiter)?;
                }
                return Ok(Step::Terminate);
            },
        };
        *self = next;
        Ok(step)
    }
}

fn main() -> poolsim::Result {
    let seed = std::env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(7);
    let mut scheduler = Scheduler::new(Store::new(seed)?);
    let door: ProcessId = scheduler.spawn(Door { next: 0 });
    println!("Opening at t=0 with door process {door}.");

    scheduler.run(VirtualTime::from(WORKDAY_MINUTES))?;

    let store = scheduler.state();
    println!(
        "Closed at t={}. Served {} customers; {} still in line.",
        scheduler.now(),
        store.served,
        store.counter.waiting()
    );
    Ok(())
}
