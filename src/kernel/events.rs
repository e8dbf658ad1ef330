mod event_holder;
pub(super) mod process;

use crate::kernel::VirtualTime;
use event_holder::EventHolder;
use process::{Process, ProcessId, ProcessState};

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Debug;

/// Priority queue of suspended processes, together with the clock and the registry of every process spawned so far.
///
/// Events will execute in ascending order of resumption time, with ties broken by the order in which they were pushed
/// onto the queue. That insertion order is the only thing deciding between same-instant effects, such as the gate
/// closing and a waiting customer re-checking admission in the same minute, so it is what makes runs reproducible.
///
/// The clock only moves when an event is popped, and is set to that event's time.
///
/// An [`EventQueue`] is owned by a [`Scheduler`] and is reachable from client code through the [`Context`] handed to
/// a resuming process and through the scheduler's shared accessors.
///
/// [`Scheduler`]: crate::kernel::Scheduler
/// [`Context`]: crate::kernel::Context
#[derive(Debug)]
pub struct EventQueue<State> {
    events: BinaryHeap<Reverse<EventHolder<State>>>,
    last_execution_time: VirtualTime,
    events_added: u64,
    processes: Vec<ProcessState>,
    passivated: HashMap<ProcessId, Box<dyn Process<State>>>,
}

impl<State> EventQueue<State> {
    /// Construct a new [`EventQueue`] with no scheduled events and a clock at zero.
    pub(crate) fn new() -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: VirtualTime::ZERO,
            events_added: 0,
            processes: Vec::new(),
            passivated: HashMap::new(),
        }
    }

    /// Register a new process resuming at the current time, after all events already scheduled for "now".
    pub(crate) fn spawn_now(&mut self, process: Box<dyn Process<State>>) -> ProcessId {
        let id = self.register();
        self.push(self.last_execution_time, id, process);
        id
    }

    /// Register a new process resuming after `delay` minutes.
    ///
    /// # Errors
    ///
    /// If `delay` is negative or not finite, returns [`Error::NegativeDelay`] and registers nothing.
    ///
    /// [`Error::NegativeDelay`]: crate::Error::NegativeDelay
    pub(crate) fn spawn_after(&mut self, delay: f64, process: Box<dyn Process<State>>) -> crate::Result<ProcessId> {
        let time = self.resumption_time(delay)?;
        let id = self.register();
        self.push(time, id, process);
        Ok(id)
    }

    /// Suspend an existing process until `delay` minutes from now.
    ///
    /// # Errors
    ///
    /// If `delay` is negative or not finite, returns [`Error::NegativeDelay`] with no modifications to the queue.
    ///
    /// [`Error::NegativeDelay`]: crate::Error::NegativeDelay
    pub(crate) fn schedule_after(
        &mut self,
        delay: f64,
        id: ProcessId,
        process: Box<dyn Process<State>>,
    ) -> crate::Result {
        let time = self.resumption_time(delay)?;
        self.set_state(id, ProcessState::Suspended);
        self.push(time, id, process);
        Ok(())
    }

    fn resumption_time(&self, delay: f64) -> crate::Result<VirtualTime> {
        if delay.is_finite() && delay >= 0.0 {
            Ok(self.last_execution_time + delay)
        } else {
            Err(crate::Error::NegativeDelay { delay })
        }
    }

    fn push(&mut self, time: VirtualTime, id: ProcessId, process: Box<dyn Process<State>>) {
        let count = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            execution_time: time,
            insertion_sequence: count,
            process_id: id,
            process,
        }));
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way across all
    /// scheduling methods.
    fn increment_event_count(&mut self) -> u64 {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    fn register(&mut self) -> ProcessId {
        self.processes.push(ProcessState::Suspended);
        ProcessId(self.processes.len() - 1)
    }

    fn set_state(&mut self, id: ProcessId, state: ProcessState) {
        if let Some(slot) = self.processes.get_mut(id.0) {
            *slot = state;
        }
    }

    /// Remove the event with the smallest `(time, sequence)` and advance the clock to its time.
    pub(crate) fn pop_next(&mut self) -> Option<(ProcessId, Box<dyn Process<State>>)> {
        let Reverse(event_holder) = self.events.pop()?;
        self.last_execution_time = event_holder.execution_time;
        self.set_state(event_holder.process_id, ProcessState::Ready);
        Some((event_holder.process_id, event_holder.process))
    }

    /// Drop every pending event and pin the clock at `horizon`.
    pub(crate) fn halt_at(&mut self, horizon: VirtualTime) {
        self.events.clear();
        if horizon > self.last_execution_time {
            self.last_execution_time = horizon;
        }
    }

    /// Park a process with no wake-up time.
    pub(crate) fn passivate(&mut self, id: ProcessId, process: Box<dyn Process<State>>) {
        self.set_state(id, ProcessState::Suspended);
        self.passivated.insert(id, process);
    }

    /// Reschedule a parked process for the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProcess`] if `id` is not parked.
    ///
    /// [`Error::UnknownProcess`]: crate::Error::UnknownProcess
    pub(crate) fn activate(&mut self, id: ProcessId) -> crate::Result {
        let process = self.passivated.remove(&id).ok_or(crate::Error::UnknownProcess(id))?;
        self.push(self.last_execution_time, id, process);
        Ok(())
    }

    pub(crate) fn terminate(&mut self, id: ProcessId) {
        self.set_state(id, ProcessState::Terminated);
    }

    /// Get the simulation's current clock time.
    pub fn current_time(&self) -> VirtualTime {
        self.last_execution_time
    }

    /// Resumption time of the next event, if any is scheduled.
    pub fn next_time(&self) -> Option<VirtualTime> {
        self.events.peek().map(|Reverse(event_holder)| event_holder.execution_time)
    }

    /// Number of scheduled events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Lifecycle state of a process, or `None` if no process with that id was ever spawned.
    pub fn process_state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id.0).copied()
    }

    /// Number of spawned processes that have not terminated yet.
    pub fn live_processes(&self) -> usize {
        self.processes
            .iter()
            .filter(|state| **state != ProcessState::Terminated)
            .count()
    }

    /// Number of processes parked by [`Step::Passivate`].
    ///
    /// [`Step::Passivate`]: crate::kernel::Step::Passivate
    pub fn passivated(&self) -> usize {
        self.passivated.len()
    }
}

impl<State> std::fmt::Display for EventQueue<State> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events at current time {}",
            self.events.len(),
            self.last_execution_time
        )
    }
}
