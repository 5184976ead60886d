//! Swap aggregator types.

use alloy::primitives::{Address, U256};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::amount::{decimal_u256, TokenAmount};

/// Which side of the trade the amount fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwapSide {
    /// Sell exactly the given source amount.
    Sell,
    /// Buy exactly the given destination amount.
    Buy,
}

impl SwapSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapSide::Sell => "SELL",
            SwapSide::Buy => "BUY",
        }
    }
}

/// A route priced by the aggregator.
///
/// Only valid at the moment it was fetched; never cached across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    pub side: SwapSide,
    pub source: TokenAmount,
    pub destination: TokenAmount,
    /// Contract that must hold the allowance, when the route names one.
    pub transfer_proxy: Option<Address>,
    /// The aggregator's route document, echoed back when building.
    pub route: serde_json::Value,
}

/// Fields of the aggregator's route document the keeper reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceRouteSummary {
    pub src_token: Address,
    pub dest_token: Address,
    #[serde(with = "decimal_u256")]
    pub src_amount: U256,
    #[serde(with = "decimal_u256")]
    pub dest_amount: U256,
    #[serde(default)]
    pub token_transfer_proxy: Option<Address>,
}

/// Transaction fields returned by the build endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuiltTransaction {
    pub to: Address,
    pub data: alloy::primitives::Bytes,
    #[serde(default, with = "decimal_u256")]
    pub value: U256,
}

/// Errors from the swap aggregator.
#[derive(Debug, Error)]
pub enum SwapError {
    /// The aggregator rejected the route as stale. Never retried in-run.
    #[error("quote expired: {0}")]
    QuoteExpired(String),

    /// Request failed or returned a non-success status.
    #[error("aggregator request failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },

    /// Response did not have the expected shape.
    #[error("invalid aggregator response: {0}")]
    InvalidResponse(String),

    /// A fresh quote named a transfer proxy that holds no allowance.
    #[error("transfer proxy changed from {approved} to {quoted} after approval")]
    SpenderChanged { approved: Address, quoted: Address },
}
