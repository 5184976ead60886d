//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduling (scheduler.rs):
//!     interval tick → in-flight guard → Job::run_once (span: job, run_id)
//!
//! Shutdown (shutdown.rs):
//!     trigger → job loops leave select! → drain with grace period
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Each job owns its interval; jobs never share a run
//! - Missed ticks are skipped, not bursted
//! - A failed run is logged and counted; the loop keeps going

pub mod scheduler;
pub mod shutdown;
pub mod signals;

pub use scheduler::{Job, JobError, JobRunner, TickOutcome};
pub use shutdown::Shutdown;
