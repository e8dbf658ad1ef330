//! The discrete-event kernel: virtual clock, event queue, cooperative processes and the run loop.
//!
//! Simulated behavior is written as [`Process`] state machines. Each resume runs a process from one suspension point
//! to the next, and only one process runs at a time, so model state needs no locking inside a run.

mod events;
mod resource;
mod scheduler;
mod time;

pub use events::process::{Context, OkProcess, Process, ProcessId, ProcessState, Step};
pub use events::EventQueue;
pub use resource::Resource;
pub use scheduler::{RunStatus, Scheduler};
pub use time::VirtualTime;
