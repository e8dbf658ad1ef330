use super::EventQueue;
use crate::kernel::VirtualTime;

use std::fmt::{Debug, Display, Formatter};

/// Identifies one process for the lifetime of a [`Scheduler`].
///
/// Ids are handed out in spawn order, starting at zero, and are never reused within a run.
///
/// [`Scheduler`]: crate::kernel::Scheduler
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub(crate) usize);

impl Display for ProcessId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a process currently is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// Popped off the queue and executing, or about to.
    Ready,
    /// Waiting on a scheduled resumption, or passivated until another process activates it.
    Suspended,
    /// Its behavior sequence completed. A terminated process is never resumed again.
    Terminated,
}

/// What a process wants to happen after it yields control back to the scheduler.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Resume this process again after the given number of simulated minutes.
    Suspend(f64),
    /// Park this process without a wake-up time. Another process must [`activate()`] it.
    ///
    /// [`activate()`]: Context::activate
    Passivate,
    /// The behavior sequence is complete.
    Terminate,
}

/// A suspendable unit of simulated behavior.
///
/// A process is a small state machine. Each call to [`resume()`] runs it uninterrupted from its previous suspension
/// point up to the next one, which it reports through the returned [`Step`]. Exclusive access is provided to the
/// simulation's state and, through the [`Context`], to the clock and the ability to spawn or wake other processes.
///
/// Requiring implementors to be [`Debug`] enables printing the full contents of an [`EventQueue`] when necessary.
///
/// [`resume()`]: Process::resume
pub trait Process<State>: Debug {
    /// Advance the process to its next suspension point.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts [`Scheduler::run()`] and is handed back to its caller unchanged. Model code is
    /// expected to report broken invariants this way rather than clamping state.
    ///
    /// [`Scheduler::run()`]: crate::kernel::Scheduler::run
    fn resume(&mut self, state: &mut State, context: &mut Context<'_, State>) -> crate::Result<Step>;
}

/// A [`Process`] that is guaranteed not to fail on resumption.
///
/// An implementation of [`Process`] is provided for all implementors of this trait which simply invokes
/// [`OkProcess::resume()`] and wraps the step in `Ok`.
pub trait OkProcess<State>: Debug {
    /// Advance the process to its next suspension point.
    fn resume(&mut self, state: &mut State, context: &mut Context<'_, State>) -> Step;
}

impl<State, OkProcessType> Process<State> for OkProcessType
where
    OkProcessType: OkProcess<State>,
{
    fn resume(&mut self, state: &mut State, context: &mut Context<'_, State>) -> crate::Result<Step> {
        Ok(OkProcess::resume(self, state, context))
    }
}

/// Handle given to a resuming process.
pub struct Context<'a, State> {
    id: ProcessId,
    event_queue: &'a mut EventQueue<State>,
}

impl<'a, State> Context<'a, State> {
    pub(crate) fn new(id: ProcessId, event_queue: &'a mut EventQueue<State>) -> Self {
        Self { id, event_queue }
    }

    /// The current simulation time.
    pub fn now(&self) -> VirtualTime {
        self.event_queue.current_time()
    }

    /// The id of the process being resumed.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Start a new process at the current instant. It runs after every event already scheduled for "now".
    pub fn spawn<ProcessType>(&mut self, process: ProcessType) -> ProcessId
    where
        ProcessType: Process<State> + 'static,
    {
        self.event_queue.spawn_now(Box::new(process))
    }

    /// Start a new process after the given delay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeDelay`] if `delay` is negative or not finite.
    ///
    /// [`Error::NegativeDelay`]: crate::Error::NegativeDelay
    pub fn spawn_after<ProcessType>(&mut self, delay: f64, process: ProcessType) -> crate::Result<ProcessId>
    where
        ProcessType: Process<State> + 'static,
    {
        self.event_queue.spawn_after(delay, Box::new(process))
    }

    /// Wake a passivated process at the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProcess`] if `id` does not name a passivated process.
    ///
    /// [`Error::UnknownProcess`]: crate::Error::UnknownProcess
    pub fn activate(&mut self, id: ProcessId) -> crate::Result {
        self.event_queue.activate(id)
    }
}
