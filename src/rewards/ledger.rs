//! Rewards service client.

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::RewardsConfig;
use crate::rewards::types::{RewardClaim, RewardsFetchError};

/// Source of claimable-reward snapshots.
#[async_trait]
pub trait RewardsLedger: Send + Sync {
    /// Current claimable reward and proof for `address`.
    async fn fetch_claim(&self, address: Address) -> Result<RewardClaim, RewardsFetchError>;
}

/// [`RewardsLedger`] over the rewards HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRewardsLedger {
    client: Client,
    base_url: String,
}

impl HttpRewardsLedger {
    pub fn new(config: &RewardsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RewardsLedger for HttpRewardsLedger {
    async fn fetch_claim(&self, address: Address) -> Result<RewardClaim, RewardsFetchError> {
        let url = format!("{}/rewards/withdraw", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("address", address.to_string())])
            .send()
            .await
            .map_err(|e| RewardsFetchError {
                status: e.status(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RewardsFetchError {
                status: Some(status),
                message: body,
            });
        }

        let claim: RewardClaim = response.json().await.map_err(|e| RewardsFetchError {
            status: Some(status),
            message: format!("invalid response body: {}", e),
        })?;

        tracing::info!(
            address = %address,
            available = %claim.available,
            cumulative = %claim.cumulative_amount,
            cycle = claim.cycle,
            total_claimed = %claim.total_claimed,
            "Fetched reward claim"
        );

        Ok(claim)
    }
}
