//! Reward ledger types.

use alloy::primitives::{B256, U256};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::amount::decimal_u256;

/// A claimable reward snapshot with its Merkle proof.
///
/// All amounts are in the reward token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaim {
    pub proof: Vec<B256>,

    /// Lifetime rewards allocated to the address.
    #[serde(with = "decimal_u256")]
    pub cumulative_amount: U256,

    pub cycle: u64,

    /// Amount claimable right now; zero means nothing to claim.
    #[serde(with = "decimal_u256")]
    pub available: U256,

    #[serde(with = "decimal_u256")]
    pub total_claimed: U256,
}

impl RewardClaim {
    pub fn has_claimable(&self) -> bool {
        !self.available.is_zero()
    }
}

/// Rewards service request failed.
#[derive(Debug, Error)]
#[error("rewards fetch failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
pub struct RewardsFetchError {
    /// Upstream HTTP status, when a response arrived.
    pub status: Option<StatusCode>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_response() {
        let body = r#"{
            "proof": [
                "0xabababababababababababababababababababababababababababababababab"
            ],
            "cumulative_amount": "125000000000000000000",
            "cycle": 7,
            "available": "1000000",
            "total_claimed": "124999999999999000000"
        }"#;
        let claim: RewardClaim = serde_json::from_str(body).unwrap();

        assert_eq!(claim.proof, vec![B256::repeat_byte(0xab)]);
        assert_eq!(claim.cumulative_amount.to_string(), "125000000000000000000");
        assert_eq!(claim.cycle, 7);
        assert_eq!(claim.available, U256::from(1_000_000u64));
        assert!(claim.has_claimable());
    }

    #[test]
    fn test_zero_available_means_nothing_to_claim() {
        let body = r#"{"proof":[],"cumulative_amount":"5","cycle":3,"available":"0","total_claimed":"5"}"#;
        let claim: RewardClaim = serde_json::from_str(body).unwrap();
        assert!(!claim.has_claimable());
    }

    #[test]
    fn test_error_display_includes_status() {
        let err = RewardsFetchError {
            status: Some(StatusCode::SERVICE_UNAVAILABLE),
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "rewards fetch failed (503 Service Unavailable): upstream down");

        let err = RewardsFetchError { status: None, message: "connect refused".to_string() };
        assert_eq!(err.to_string(), "rewards fetch failed: connect refused");
    }
}
