//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the keeper.
//! All types derive Serde traits for deserialization from config files.
//! The signing key is deliberately absent: it is read from the environment
//! by [`crate::blockchain::Wallet::from_env`].

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Root configuration for the keeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KeeperConfig {
    /// JSON-RPC node and transaction settings.
    pub chain: ChainConfig,

    /// Reward pool and token addresses.
    pub claim: ClaimConfig,

    /// Rewards ledger service.
    pub rewards: RewardsConfig,

    /// Swap aggregator service.
    pub aggregator: AggregatorConfig,

    /// Swap notifications.
    pub notifier: NotifierConfig,

    /// Weather station telemetry service.
    pub station: StationConfig,

    /// Third-party weather network upload.
    pub upload: UploadConfig,

    /// Job intervals and toggles.
    pub schedule: ScheduleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (42161 for Arbitrum One).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Blocks on top of the inclusion block before a transaction counts as confirmed.
    pub confirmation_blocks: u32,

    /// Upper bound on waiting for a receipt.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Fixed gas limit for every transaction.
    pub gas_limit: u64,

    /// Fixed gas price in wei for every transaction.
    pub gas_price_wei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 42161,
            rpc_timeout_secs: 10,
            confirmation_blocks: 0,
            confirmation_timeout_secs: 300,
            receipt_poll_interval_ms: 2000,
            gas_limit: 500_000,
            gas_price_wei: 100_000_000, // 0.1 gwei
        }
    }
}

/// Claim-and-swap addresses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimConfig {
    /// Reward pool contract exposing `claim`.
    pub contract_address: Address,

    /// Reward token (swap source).
    pub source_token: Address,

    /// Token to swap into.
    pub destination_token: Address,

    /// Who receives the swap output; the keeper wallet when unset.
    pub receiver: Option<Address>,

    pub source_decimals: u8,
    pub destination_decimals: u8,

    /// Symbols used in notifications.
    pub source_symbol: String,
    pub destination_symbol: String,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            contract_address: Address::ZERO,
            source_token: Address::ZERO,
            destination_token: Address::ZERO,
            receiver: None,
            source_decimals: 18,
            destination_decimals: 18,
            source_symbol: "WXM".to_string(),
            destination_symbol: "ETH".to_string(),
        }
    }
}

/// Rewards ledger service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Base URL; `/rewards/withdraw` is appended.
    pub base_url: String,

    pub timeout_secs: u64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherxm.com/api/v1/network".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Swap aggregator service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub base_url: String,

    pub timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apiv5.paraswap.io".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Telegram notification settings. Both credentials must be present for
/// notifications to be sent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub api_base: String,

    pub bot_token: Option<String>,

    pub chat_id: Option<String>,

    /// Prefix for transaction links in messages.
    pub explorer_tx_url: String,

    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: None,
            chat_id: None,
            explorer_tx_url: "https://arbiscan.io/tx/".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Weather station telemetry service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StationConfig {
    pub base_url: String,

    pub device_id: String,

    /// Initial bearer token.
    pub access_token: String,

    /// Initial refresh token.
    pub refresh_token: String,

    /// Pause before refreshing an expired token.
    pub refresh_backoff_secs: u64,

    pub timeout_secs: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherxm.com/api/v1".to_string(),
            device_id: String::new(),
            access_token: String::new(),
            refresh_token: String::new(),
            refresh_backoff_secs: 10,
            timeout_secs: 30,
        }
    }
}

/// Weather network upload endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub url: String,

    pub station_id: String,

    pub station_password: String,

    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: "https://weatherstation.wunderground.com/weatherstation/updateweatherstation.php"
                .to_string(),
            station_id: String::new(),
            station_password: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Job scheduling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub claim_enabled: bool,

    /// Claim-and-swap interval in seconds.
    pub claim_interval_secs: u64,

    pub poll_enabled: bool,

    /// Station poll interval in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            claim_enabled: true,
            claim_interval_secs: 60 * 60,
            poll_enabled: true,
            poll_interval_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
