//! Swap aggregator client.
//!
//! # Responsibilities
//! - Price a sell of the reward token (`GET /prices`)
//! - Look up the transfer proxy that spends approved tokens
//! - Turn a priced route into an executable transaction
//!
//! # Design Decisions
//! - No retries: a rejected or stale route ends the run
//! - Gas fields returned by the build endpoint are ignored; the chain
//!   client applies the configured gas limit and price

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::blockchain::amount::TokenAmount;
use crate::blockchain::types::{TxKind, TxPayload};
use crate::config::AggregatorConfig;
use crate::swap::types::{BuiltTransaction, PriceRouteSummary, SwapError, SwapQuote, SwapSide};

/// Quote and build operations against a swap aggregator.
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Price trading `amount` of `source` for `destination`.
    async fn get_quote(
        &self,
        source: Address,
        destination: Address,
        amount: U256,
        side: SwapSide,
    ) -> Result<SwapQuote, SwapError>;

    /// Contract that must be approved to spend the source token.
    async fn get_transfer_proxy(&self) -> Result<Address, SwapError>;

    /// Build the swap transaction for `quote`, paying out to `receiver`.
    async fn build_swap_transaction(
        &self,
        quote: &SwapQuote,
        receiver: Address,
    ) -> Result<TxPayload, SwapError>;
}

/// Paraswap-compatible [`SwapAggregator`].
#[derive(Debug, Clone)]
pub struct ParaswapClient {
    client: Client,
    base_url: String,
    /// Chain ID sent as the `network` parameter.
    network: u64,
    /// Address that sends the swap transaction.
    user: Address,
    source_decimals: u8,
    destination_decimals: u8,
}

#[derive(Deserialize)]
struct PricesResponse {
    #[serde(rename = "priceRoute")]
    price_route: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ParaswapClient {
    pub fn new(config: &AggregatorConfig, network: u64, user: Address) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url, network, user))
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: Client, base_url: &str, network: u64, user: Address) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network,
            user,
            source_decimals: 18,
            destination_decimals: 18,
        }
    }

    /// Decimals of the traded tokens.
    pub fn with_decimals(mut self, source: u8, destination: u8) -> Self {
        self.source_decimals = source;
        self.destination_decimals = destination;
        self
    }

    /// Read the error text from a failed response.
    async fn error_message(response: Response) -> String {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) => text,
        }
    }
}

/// Whether a build rejection means the route went stale.
pub fn is_stale_rejection(status: StatusCode, message: &str) -> bool {
    if status == StatusCode::CONFLICT || status == StatusCode::GONE {
        return true;
    }
    let message = message.to_lowercase();
    status.is_client_error()
        && ["rate has changed", "expired", "re-query", "stale", "price impact"]
            .iter()
            .any(|needle| message.contains(needle))
}

fn upstream(e: reqwest::Error) -> SwapError {
    SwapError::Upstream {
        status: e.status(),
        message: e.to_string(),
    }
}

#[async_trait]
impl SwapAggregator for ParaswapClient {
    async fn get_quote(
        &self,
        source: Address,
        destination: Address,
        amount: U256,
        side: SwapSide,
    ) -> Result<SwapQuote, SwapError> {
        let url = format!("{}/prices", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("srcToken", source.to_string()),
                ("destToken", destination.to_string()),
                ("amount", amount.to_string()),
                ("srcDecimals", self.source_decimals.to_string()),
                ("destDecimals", self.destination_decimals.to_string()),
                ("side", side.as_str().to_string()),
                ("network", self.network.to_string()),
                ("userAddress", self.user.to_string()),
            ])
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwapError::Upstream {
                status: Some(status),
                message: Self::error_message(response).await,
            });
        }

        let body: PricesResponse = response
            .json()
            .await
            .map_err(|e| SwapError::InvalidResponse(e.to_string()))?;
        let summary: PriceRouteSummary = serde_json::from_value(body.price_route.clone())
            .map_err(|e| SwapError::InvalidResponse(format!("priceRoute: {}", e)))?;

        if summary.src_token != source || summary.dest_token != destination {
            return Err(SwapError::InvalidResponse(format!(
                "route prices {} -> {}, requested {} -> {}",
                summary.src_token, summary.dest_token, source, destination
            )));
        }

        let quote = SwapQuote {
            side,
            source: TokenAmount::new(source, summary.src_amount),
            destination: TokenAmount::new(destination, summary.dest_amount),
            transfer_proxy: summary.token_transfer_proxy,
            route: body.price_route,
        };

        tracing::info!(
            src_amount = %quote.source.amount,
            dest_amount = %quote.destination.amount,
            transfer_proxy = ?quote.transfer_proxy,
            "Received swap quote"
        );

        Ok(quote)
    }

    async fn get_transfer_proxy(&self) -> Result<Address, SwapError> {
        let url = format!("{}/adapters/contracts", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("network", self.network.to_string())])
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwapError::Upstream {
                status: Some(status),
                message: Self::error_message(response).await,
            });
        }

        let contracts: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SwapError::InvalidResponse(e.to_string()))?;
        contracts
            .get("TokenTransferProxy")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SwapError::InvalidResponse("missing TokenTransferProxy".to_string()))?
            .parse()
            .map_err(|e| SwapError::InvalidResponse(format!("TokenTransferProxy: {}", e)))
    }

    async fn build_swap_transaction(
        &self,
        quote: &SwapQuote,
        receiver: Address,
    ) -> Result<TxPayload, SwapError> {
        let url = format!("{}/transactions/{}", self.base_url, self.network);
        let body = json!({
            "srcToken": quote.source.token.to_string(),
            "destToken": quote.destination.token.to_string(),
            "srcAmount": quote.source.amount.to_string(),
            "destAmount": quote.destination.amount.to_string(),
            "srcDecimals": self.source_decimals,
            "destDecimals": self.destination_decimals,
            "priceRoute": quote.route,
            "userAddress": self.user.to_string(),
            "receiver": receiver.to_string(),
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            if is_stale_rejection(status, &message) {
                return Err(SwapError::QuoteExpired(message));
            }
            return Err(SwapError::Upstream {
                status: Some(status),
                message,
            });
        }

        let built: BuiltTransaction = response
            .json()
            .await
            .map_err(|e| SwapError::InvalidResponse(e.to_string()))?;

        Ok(TxPayload {
            kind: TxKind::Swap,
            to: built.to,
            data: built.data,
            value: built.value,
        })
    }
}
