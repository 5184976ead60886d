//! Reward ledger module.

pub mod ledger;
pub mod types;

pub use ledger::{HttpRewardsLedger, RewardsLedger};
pub use types::{RewardClaim, RewardsFetchError};
