//! Swap quoting and transaction building.

pub mod aggregator;
pub mod types;

pub use aggregator::{ParaswapClient, SwapAggregator};
pub use types::{SwapError, SwapQuote, SwapSide};
