//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! keeper.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (CHAIN_ID, RPC_URL, WXM_*, ...)
//!     → validation.rs (semantic checks)
//!     → KeeperConfig (validated, immutable)
//!     → split into per-component settings at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The signing key never passes through this module

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use validation::validate_config;
pub use schema::{
    AggregatorConfig, ChainConfig, ClaimConfig, KeeperConfig, NotifierConfig,
    ObservabilityConfig, RewardsConfig, ScheduleConfig, StationConfig, UploadConfig,
};
