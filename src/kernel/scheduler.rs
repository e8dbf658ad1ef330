use super::{Context, EventQueue, Process, ProcessId, ProcessState, Step, VirtualTime};

use std::fmt::Formatter;
use tracing::trace;

/// Lifecycle of a [`Scheduler`]. A scheduler runs at most once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Processes may be spawned; [`Scheduler::run()`] has not been called yet.
    Idle,
    /// The run loop is executing events.
    Running,
    /// The event queue emptied before the horizon was reached.
    Drained,
    /// The horizon was reached, or a process failed.
    Halted,
}

/// Contains the event queue, the clock and the model state belonging to one simulation run.
///
/// The defining struct for a discrete-event simulation in poolsim. A [`Scheduler`] owns both its state and its event
/// queue, providing both shared and mutable access to the state so clients can set up and tear down instances as
/// needed - for example, seeding initial counters or reading statistics after the run.
///
/// The expected workflow for a Scheduler is:
///
/// 1. Initialize the model state.
/// 2. Pass it to [`new()`].
/// 3. [`spawn()`] at least one initial process.
/// 4. Call [`run()`] with the horizon. Handle any error it might return.
/// 5. Use [`state()`] or [`into_state()`] to finish processing the results.
///
/// All mutable state of a run (queue, clock, sequence counter, process registry) belongs to exactly one scheduler, so
/// independent schedulers may run on different threads without any synchronization.
///
/// [`new()`]: Scheduler::new
/// [`spawn()`]: Scheduler::spawn
/// [`run()`]: Scheduler::run
/// [`state()`]: Scheduler::state
/// [`into_state()`]: Scheduler::into_state
#[derive(Debug)]
pub struct Scheduler<State> {
    /// Suspended processes ordered ascending by resumption time, then by insertion sequence.
    event_queue: EventQueue<State>,
    /// The current shared state of the run. Exclusive access will be granted to each process as it resumes.
    state: State,
    status: RunStatus,
}

impl<State> Scheduler<State> {
    /// Initialize a Scheduler with the provided starting state and a clock at zero.
    pub fn new(initial_state: State) -> Self {
        Self {
            event_queue: EventQueue::new(),
            state: initial_state,
            status: RunStatus::Idle,
        }
    }

    /// Start a process at the current instant, after any process already scheduled for "now".
    pub fn spawn<ProcessType>(&mut self, process: ProcessType) -> ProcessId
    where
        ProcessType: Process<State> + 'static,
    {
        self.event_queue.spawn_now(Box::new(process))
    }

    /// Start a process after the given delay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeDelay`] if `delay` is negative or not finite, with no modifications to the queue.
    ///
    /// [`Error::NegativeDelay`]: crate::Error::NegativeDelay
    pub fn spawn_after<ProcessType>(&mut self, delay: f64, process: ProcessType) -> crate::Result<ProcessId>
    where
        ProcessType: Process<State> + 'static,
    {
        self.event_queue.spawn_after(delay, Box::new(process))
    }

    /// Resume processes from the event queue, one at a time, in ascending `(time, sequence)` order.
    ///
    /// Follows this loop:
    ///
    /// 1. Is the queue empty? If so, the run is [`Drained`].
    /// 2. Is the next event later than `until`? If so, pin the clock at `until`, discard the remaining events and
    ///    report [`Halted`]. Nothing scheduled past the horizon is observable.
    /// 3. Pop the event, advancing the clock to its time, and resume its process.
    ///     1. If the process fails, mark the run [`Halted`] and forward the error as-is.
    ///     2. Otherwise reschedule, park or retire the process according to its [`Step`] and go back to step 1.
    ///
    /// # Errors
    ///
    /// 1. [`Error::RunFinished`] if this scheduler has already run. A run instance is never reused.
    /// 2. [`Error::NegativeDelay`] if a process asked to be resumed in the past.
    /// 3. Any error returned by a process, such as [`Error::InvariantViolation`].
    ///
    /// [`Drained`]: RunStatus::Drained
    /// [`Halted`]: RunStatus::Halted
    /// [`Error::RunFinished`]: crate::Error::RunFinished
    /// [`Error::NegativeDelay`]: crate::Error::NegativeDelay
    /// [`Error::InvariantViolation`]: crate::Error::InvariantViolation
    pub fn run(&mut self, until: VirtualTime) -> crate::Result<RunStatus> {
        if self.status != RunStatus::Idle {
            return Err(crate::Error::RunFinished);
        }
        self.status = RunStatus::Running;

        loop {
            match self.event_queue.next_time() {
                None => {
                    self.status = RunStatus::Drained;
                    break;
                },
                Some(next_time) if next_time > until => {
                    self.event_queue.halt_at(until);
                    self.status = RunStatus::Halted;
                    break;
                },
                Some(_) => {},
            }

            if let Some((id, process)) = self.event_queue.pop_next() {
                if let Err(error) = self.resume(id, process) {
                    self.status = RunStatus::Halted;
                    return Err(error);
                }
            }
        }

        trace!(status = ?self.status, now = %self.now(), "run finished");
        Ok(self.status)
    }

    fn resume(&mut self, id: ProcessId, mut process: Box<dyn Process<State>>) -> crate::Result {
        let step = {
            let mut context = Context::new(id, &mut self.event_queue);
            process.resume(&mut self.state, &mut context)?
        };
        trace!(process = %id, now = %self.now(), ?step, "resumed");

        match step {
            Step::Suspend(delay) => self.event_queue.schedule_after(delay, id, process),
            Step::Passivate => {
                self.event_queue.passivate(id, process);
                Ok(())
            },
            Step::Terminate => {
                self.event_queue.terminate(id);
                Ok(())
            },
        }
    }

    /// The current simulation time.
    pub fn now(&self) -> VirtualTime {
        self.event_queue.current_time()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Lifecycle state of a spawned process.
    pub fn process_state(&self, id: ProcessId) -> Option<ProcessState> {
        self.event_queue.process_state(id)
    }

    /// Number of spawned processes that have not terminated.
    pub fn live_processes(&self) -> usize {
        self.event_queue.live_processes()
    }

    /// Get a shared reference to the simulation state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get an exclusive reference to the simulation state.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Consume the scheduler, keeping only the simulation state.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Get a shared reference to the event queue.
    pub fn event_queue(&self) -> &EventQueue<State> {
        &self.event_queue
    }
}

impl<State> std::fmt::Display for Scheduler<State> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduler ({:?}) at time {}", self.status, self.event_queue.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::OkProcess;

    #[derive(Debug, Default)]
    struct State {
        executed_values: Vec<u32>,
    }

    /// Records its value, then either repeats after `period` or terminates.
    #[derive(Debug)]
    struct Recorder {
        value: u32,
        period: Option<f64>,
    }

    impl OkProcess<State> for Recorder {
        fn resume(&mut self, state: &mut State, _: &mut Context<'_, State>) -> Step {
            state.executed_values.push(self.value);
            match self.period {
                Some(period) => Step::Suspend(period),
                None => Step::Terminate,
            }
        }
    }

    #[derive(Debug)]
    struct BackInTime;

    impl Process<State> for BackInTime {
        fn resume(&mut self, _: &mut State, _: &mut Context<'_, State>) -> crate::Result<Step> {
            Ok(Step::Suspend(-1.0))
        }
    }

    fn setup() -> Scheduler<State> {
        let mut sim = Scheduler::new(State::default());
        let values = [1, 3, 2];
        for (i, value) in values.into_iter().enumerate() {
            sim.spawn_after(2.0 * i as f64, Recorder { value, period: None })
                .unwrap();
        }
        sim
    }

    #[test]
    fn scheduler_executes_processes() {
        let mut sim = setup();
        assert_eq!(RunStatus::Drained, sim.run(VirtualTime::from(100)).unwrap());

        let expected = vec![1, 3, 2];
        assert_eq!(
            expected, sim.state().executed_values,
            "processes did not execute in correct order"
        );
        assert_eq!(0, sim.live_processes(), "every process should have terminated");
        assert_eq!(4.0, sim.now().as_minutes(), "drained run should keep the last event's time");
    }

    #[test]
    fn simultaneous_processes_run_in_spawn_order() {
        let mut sim = Scheduler::new(State::default());
        for value in [5, 4, 6, 1] {
            sim.spawn(Recorder { value, period: None });
        }
        sim.run(VirtualTime::ZERO).unwrap();

        assert_eq!(vec![5, 4, 6, 1], sim.state().executed_values);
    }

    #[test]
    fn scheduler_halts_at_horizon() {
        let mut sim = setup();
        let repeating = sim.spawn(Recorder {
            value: 9,
            period: Some(1.5),
        });
        assert_eq!(RunStatus::Halted, sim.run(VirtualTime::from(3)).unwrap());

        // repeater at 0, 1.5, 3.0 (inclusive horizon); recorders at 0 and 2
        assert_eq!(vec![1, 9, 9, 3, 9], sim.state().executed_values);
        assert_eq!(VirtualTime::from(3), sim.now(), "clock should be pinned at the horizon");
        assert!(sim.event_queue().is_empty(), "events past the horizon should be discarded");
        assert_eq!(Some(ProcessState::Suspended), sim.process_state(repeating));
    }

    #[test]
    fn scheduler_is_not_reusable() {
        let mut sim = setup();
        sim.run(VirtualTime::from(1)).unwrap();
        assert_eq!(Err(crate::Error::RunFinished), sim.run(VirtualTime::from(10)));
    }

    #[test]
    fn negative_resumption_aborts_run() {
        let mut sim = setup();
        sim.spawn_after(1.0, BackInTime).unwrap();

        assert_eq!(Err(crate::Error::NegativeDelay { delay: -1.0 }), sim.run(VirtualTime::from(10)));
        assert_eq!(RunStatus::Halted, sim.status());
        assert_eq!(vec![1], sim.state().executed_values, "no event should run after the failure");
    }
}
