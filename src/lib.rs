//! # Overview
//!
//! poolsim is a small discrete-event simulation kernel together with the queueing model it was built to benchmark: a
//! swimming pool whose gate opens for one minute every hour, whose visitors arrive as a Poisson stream and balk at a
//! long queue, and whose capacity bounds how many swimmers can be inside at once.
//!
//! The [`kernel`] provides the pieces any process-oriented simulation needs:
//!
//! * [`Process`] state machines that run uninterrupted between explicit suspension points, with exclusive access to
//!   the simulation's state while they run. No interior mutability or locking is needed inside a run.
//! * An [`EventQueue`] ordered by resumption time and then by insertion sequence, so simultaneous events always run in
//!   the order they were scheduled and a fixed seed reproduces a run exactly.
//! * A [`Scheduler`] that owns the queue, the clock and the state of exactly one run, and drives it up to a horizon.
//! * A generic capacity-limited [`Resource`] with a FIFO wait list.
//!
//! The [`pool`] module builds the swimming pool model on top of the kernel, [`stats`] collects per-experiment
//! outcomes, and [`experiment`] repeats the model over independently seeded runs and aggregates them into the
//! `Summary:` record consumed by external benchmarking tools.
//!
//! As a [`Scheduler`] owns all data associated with a replication, experiments share nothing but their read-only
//! [`ExperimentConfig`]. Enable the `parallel` feature to run them on a rayon thread pool; results do not depend on
//! which thread ran which experiment.
//!
//! [`Process`]: kernel::Process
//! [`EventQueue`]: kernel::EventQueue
//! [`Scheduler`]: kernel::Scheduler
//! [`Resource`]: kernel::Resource
//! [`ExperimentConfig`]: config::ExperimentConfig

pub mod config;
mod error;
pub mod experiment;
pub mod kernel;
pub mod pool;
pub mod stats;

pub use config::ExperimentConfig;
pub use error::{Error, Result};
pub use experiment::{run_experiment, run_experiments, ExperimentSummary, SummaryRecord};
