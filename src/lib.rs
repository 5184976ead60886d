//! Station keeper library.
//!
//! Two periodic jobs share this crate: claim-and-swap of accrued station
//! rewards, and relaying station telemetry to a public weather network.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod orchestrator;
pub mod rewards;
pub mod station;
pub mod swap;

pub use config::KeeperConfig;
pub use lifecycle::{Job, JobRunner, Shutdown};
pub use orchestrator::ClaimAndSwap;
pub use station::StationPoller;
