//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use alloy::primitives::Address;

use crate::config::schema::KeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, reason } => write!(f, "Invalid {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then environment overrides,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<KeeperConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// File plus environment overrides, unvalidated. Callers that narrow the
/// enabled jobs validate afterwards.
pub fn read_config(path: Option<&Path>) -> Result<KeeperConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => KeeperConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process
/// state. Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut KeeperConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get("CHAIN_ID") {
        config.chain.chain_id = v.parse().map_err(|e| ConfigError::Env {
            var: "CHAIN_ID",
            reason: format!("{}", e),
        })?;
    }
    if let Some(v) = get("RPC_URL") {
        config.chain.rpc_url = v;
    }

    let address = |var: &'static str| -> Result<Option<Address>, ConfigError> {
        get(var)
            .map(|v| {
                v.parse::<Address>().map_err(|e| ConfigError::Env {
                    var,
                    reason: e.to_string(),
                })
            })
            .transpose()
    };

    if let Some(a) = address("WXM_CLAIM_CONTRACT_ADDRESS")? {
        config.claim.contract_address = a;
    }
    if let Some(a) = address("SOURCE_TOKEN_ADDRESS")? {
        config.claim.source_token = a;
    }
    if let Some(a) = address("DESTINATION_TOKEN_ADDRESS")? {
        config.claim.destination_token = a;
    }
    if let Some(a) = address("DESTINATION_ADDRESS")? {
        config.claim.receiver = Some(a);
    }

    if let Some(v) = get("TELEGRAM_CHAT_ID") {
        config.notifier.chat_id = Some(v);
    }
    if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
        config.notifier.bot_token = Some(v);
    }

    if let Some(v) = get("WXM_TOKEN") {
        config.station.access_token = v;
    }
    if let Some(v) = get("WXM_REFRESH_TOKEN") {
        config.station.refresh_token = v;
    }
    if let Some(v) = get("WXM_DEVICE_ID") {
        config.station.device_id = v;
    }
    if let Some(v) = get("WUNDERGROUND_STATION_ID") {
        config.upload.station_id = v;
    }
    if let Some(v) = get("WUNDERGROUND_STATION_PASSWORD") {
        config.upload.station_password = v;
    }

    Ok(())
}
