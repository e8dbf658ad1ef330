use poolsim::kernel::{Context, OkProcess, Process, ProcessId, ProcessState, RunStatus, Scheduler, Step, VirtualTime};
use poolsim::Error;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Records `(time, label)` for every resumption.
#[derive(Debug, Default)]
struct Trace {
    entries: Vec<(f64, &'static str)>,
    sleeper: Option<ProcessId>,
}

#[derive(Debug)]
struct Ticker {
    label: &'static str,
    period: f64,
    remaining: usize,
}

impl OkProcess<Trace> for Ticker {
    fn resume(&mut self, trace: &mut Trace, context: &mut Context<'_, Trace>) -> Step {
        trace.entries.push((context.now().as_minutes(), self.label));
        if self.remaining == 0 {
            return Step::Terminate;
        }
        self.remaining -= 1;
        Step::Suspend(self.period)
    }
}

#[test]
fn interleaves_processes_by_time_then_schedule_order() {
    let mut scheduler = Scheduler::new(Trace::default());
    scheduler.spawn(Ticker {
        label: "a",
        period: 2.0,
        remaining: 2,
    });
    scheduler.spawn(Ticker {
        label: "b",
        period: 1.0,
        remaining: 4,
    });

    assert_eq!(RunStatus::Drained, scheduler.run(VirtualTime::from(100)).unwrap());
    assert_eq!(
        vec![
            (0.0, "a"),
            (0.0, "b"),
            (1.0, "b"),
            (2.0, "a"),
            (2.0, "b"),
            (3.0, "b"),
            (4.0, "a"),
            (4.0, "b"),
        ],
        scheduler.state().entries
    );
    assert_eq!(0, scheduler.live_processes());
    assert_eq!(VirtualTime::from(4), scheduler.now());
}

#[test]
fn event_at_the_horizon_runs_and_later_ones_are_discarded() {
    let mut scheduler = Scheduler::new(Trace::default());
    let id = scheduler.spawn(Ticker {
        label: "t",
        period: 5.0,
        remaining: 10,
    });

    assert_eq!(RunStatus::Halted, scheduler.run(VirtualTime::from(10)).unwrap());
    let times: Vec<f64> = scheduler.state().entries.iter().map(|(time, _)| *time).collect();
    assert_eq!(vec![0.0, 5.0, 10.0], times);
    assert_eq!(VirtualTime::from(10), scheduler.now());
    assert!(scheduler.event_queue().is_empty());
    assert_eq!(Some(ProcessState::Suspended), scheduler.process_state(id));
}

#[test]
fn idle_clock_is_pinned_at_the_horizon() {
    let mut scheduler = Scheduler::new(Trace::default());
    scheduler
        .spawn_after(
            30.0,
            Ticker {
                label: "late",
                period: 1.0,
                remaining: 0,
            },
        )
        .unwrap();

    assert_eq!(RunStatus::Halted, scheduler.run(VirtualTime::from(12)).unwrap());
    assert!(scheduler.state().entries.is_empty());
    assert_eq!(VirtualTime::from(12), scheduler.now());
}

/// Parks itself on first resumption and logs when woken.
#[derive(Debug)]
struct Sleeper {
    parked: bool,
}

impl OkProcess<Trace> for Sleeper {
    fn resume(&mut self, trace: &mut Trace, context: &mut Context<'_, Trace>) -> Step {
        if self.parked {
            trace.entries.push((context.now().as_minutes(), "woken"));
            return Step::Terminate;
        }
        self.parked = true;
        trace.sleeper = Some(context.id());
        Step::Passivate
    }
}

/// Wakes the sleeper after a delay.
#[derive(Debug)]
struct Alarm {
    armed: bool,
}

impl Process<Trace> for Alarm {
    fn resume(&mut self, trace: &mut Trace, context: &mut Context<'_, Trace>) -> poolsim::Result<Step> {
        if !self.armed {
            self.armed = true;
            return Ok(Step::Suspend(7.5));
        }

        if let Some(sleeper) = trace.sleeper {
            context.activate(sleeper)?;
        }
        trace.entries.push((context.now().as_minutes(), "alarm"));
        Ok(Step::Terminate)
    }
}

#[test]
fn activation_wakes_a_passivated_process_at_the_current_instant() {
    let mut scheduler = Scheduler::new(Trace::default());
    let sleeper = scheduler.spawn(Sleeper { parked: false });
    scheduler.spawn(Alarm { armed: false });

    assert_eq!(RunStatus::Drained, scheduler.run(VirtualTime::from(60)).unwrap());
    assert_eq!(vec![(7.5, "alarm"), (7.5, "woken")], scheduler.state().entries);
    assert_eq!(Some(ProcessState::Terminated), scheduler.process_state(sleeper));
    assert_eq!(0, scheduler.event_queue().passivated());
}

#[test]
fn a_never_woken_process_does_not_keep_the_run_alive() {
    let mut scheduler = Scheduler::new(Trace::default());
    let sleeper = scheduler.spawn(Sleeper { parked: false });

    assert_eq!(RunStatus::Drained, scheduler.run(VirtualTime::from(60)).unwrap());
    assert_eq!(Some(ProcessState::Suspended), scheduler.process_state(sleeper));
    assert_eq!(1, scheduler.event_queue().passivated());
    assert_eq!(1, scheduler.live_processes());
}

#[derive(Debug)]
struct Wanderer {
    rng: Pcg64,
    hops: usize,
}

impl OkProcess<Trace> for Wanderer {
    fn resume(&mut self, trace: &mut Trace, context: &mut Context<'_, Trace>) -> Step {
        trace.entries.push((context.now().as_minutes(), "hop"));
        if self.hops == 0 {
            return Step::Terminate;
        }
        self.hops -= 1;
        Step::Suspend(self.rng.random_range(0.0..3.0))
    }
}

fn wander(seed: u64) -> Vec<(f64, &'static str)> {
    let mut scheduler = Scheduler::new(Trace::default());
    for offset in 0..3 {
        scheduler.spawn(Wanderer {
            rng: Pcg64::seed_from_u64(seed + offset),
            hops: 50,
        });
    }
    scheduler.run(VirtualTime::from(1000)).unwrap();
    scheduler.into_state().entries
}

#[test]
fn seeded_runs_are_reproducible_and_monotone() {
    let first = wander(9);
    assert_eq!(first, wander(9));
    assert_eq!(153, first.len());
    assert!(first.windows(2).all(|pair| pair[0].0 <= pair[1].0), "clock went backwards");
}

#[derive(Debug)]
struct Rewinder;

impl OkProcess<Trace> for Rewinder {
    fn resume(&mut self, _trace: &mut Trace, _context: &mut Context<'_, Trace>) -> Step {
        Step::Suspend(-1.0)
    }
}

#[test]
fn scheduling_into_the_past_aborts_the_run() {
    let mut scheduler = Scheduler::new(Trace::default());
    scheduler.spawn(Rewinder);

    assert_eq!(Err(Error::NegativeDelay { delay: -1.0 }), scheduler.run(VirtualTime::from(5)));
    assert_eq!(RunStatus::Halted, scheduler.status());
    assert_eq!(Err(Error::RunFinished), scheduler.run(VirtualTime::from(5)));
    assert!(matches!(
        scheduler.spawn_after(f64::NAN, Rewinder),
        Err(Error::NegativeDelay { .. })
    ));
}
