use crate::kernel::{ProcessId, VirtualTime};

/// Errors that may be encountered while configuring or executing a simulation.
///
/// The [`Configuration`] variant is raised before any run starts, so no partial results exist when it is returned.
///
/// The [`NegativeDelay`] variant originates from the [`EventQueue`] to indicate that a process asked to be resumed
/// in the past. This likely corresponds to a logical bug in the process, e.g. subtracting instead of adding an offset.
///
/// The [`InvariantViolation`] variant is raised by model code when a state change would break one of its invariants,
/// for example admitting a swimmer into a full pool. The run is aborted rather than clamping the offending counter.
///
/// [`EventQueue`]: crate::kernel::EventQueue
/// [`Configuration`]: Error::Configuration
/// [`NegativeDelay`]: Error::NegativeDelay
/// [`InvariantViolation`]: Error::InvariantViolation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter was outside of its valid range.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The event queue rejected a resumption that would have been scheduled for a time that has already passed.
    #[error("cannot schedule an event with negative delay {delay}")]
    NegativeDelay { delay: f64 },
    /// Model state would have left its valid range.
    #[error("invariant violated at t={time}: {message}")]
    InvariantViolation { time: VirtualTime, message: String },
    /// [`activate()`] was called for a process that is not passivated.
    ///
    /// [`activate()`]: crate::kernel::Context::activate
    #[error("process {0} is not passivated")]
    UnknownProcess(ProcessId),
    /// A scheduler was asked to run after it had already drained or halted.
    #[error("simulation run has already finished")]
    RunFinished,
    /// Program output contained no line starting with `Summary:`.
    #[error("no summary line found in output")]
    MissingSummary,
    /// The summary record could not be encoded or decoded.
    #[error("malformed summary record: {0}")]
    Summary(#[from] serde_json::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Configuration(m1), Error::Configuration(m2)) => m1 == m2,
            (Error::NegativeDelay { delay: d1 }, Error::NegativeDelay { delay: d2 }) => d1.to_bits() == d2.to_bits(),
            (
                Error::InvariantViolation { time: t1, message: m1 },
                Error::InvariantViolation { time: t2, message: m2 },
            ) => t1 == t2 && m1 == m2,
            (Error::UnknownProcess(p1), Error::UnknownProcess(p2)) => p1 == p2,
            (Error::RunFinished, Error::RunFinished) => true,
            (Error::MissingSummary, Error::MissingSummary) => true,
            // serde_json errors carry no identity worth comparing
            _ => false,
        }
    }
}

/// [`std::result::Result`]`<T, `[`poolsim::Error`]`>`, defaulting to `T = ()`.
///
/// [`poolsim::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
