//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required addresses and credentials for each enabled job
//! - Validate value ranges (intervals and timeouts > 0, URLs parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Disabled jobs are not validated
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::KeeperConfig;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` and return every problem found.
pub fn validate_config(config: &KeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let schedule = &config.schedule;

    if schedule.claim_enabled {
        validate_claim_job(config, &mut errors);
    }
    if schedule.poll_enabled {
        validate_poll_job(config, &mut errors);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_claim_job(config: &KeeperConfig, errors: &mut Vec<ValidationError>) {
    let chain = &config.chain;
    let claim = &config.claim;

    check_url("chain.rpc_url", &chain.rpc_url, errors);
    check_url("rewards.base_url", &config.rewards.base_url, errors);
    check_url("aggregator.base_url", &config.aggregator.base_url, errors);

    if chain.chain_id == 0 {
        errors.push(ValidationError::new("chain.chain_id", "must be non-zero"));
    }
    if chain.gas_limit == 0 {
        errors.push(ValidationError::new("chain.gas_limit", "must be non-zero"));
    }
    if chain.gas_price_wei == 0 {
        errors.push(ValidationError::new("chain.gas_price_wei", "must be non-zero"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be non-zero"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be non-zero so confirmations cannot hang",
        ));
    }
    if config.schedule.claim_interval_secs == 0 {
        errors.push(ValidationError::new(
            "schedule.claim_interval_secs",
            "must be non-zero",
        ));
    }

    check_address("claim.contract_address", claim.contract_address, errors);
    check_address("claim.source_token", claim.source_token, errors);
    check_address("claim.destination_token", claim.destination_token, errors);
    if claim.source_token == claim.destination_token && claim.source_token != Address::ZERO {
        errors.push(ValidationError::new(
            "claim.destination_token",
            "must differ from claim.source_token",
        ));
    }
    if claim.receiver == Some(Address::ZERO) {
        errors.push(ValidationError::new("claim.receiver", "must not be the zero address"));
    }
}

fn validate_poll_job(config: &KeeperConfig, errors: &mut Vec<ValidationError>) {
    let station = &config.station;
    let upload = &config.upload;

    check_url("station.base_url", &station.base_url, errors);
    check_url("upload.url", &upload.url, errors);

    for (field, value) in [
        ("station.device_id", &station.device_id),
        ("station.access_token", &station.access_token),
        ("station.refresh_token", &station.refresh_token),
        ("upload.station_id", &upload.station_id),
        ("upload.station_password", &upload.station_password),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }

    if config.schedule.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "schedule.poll_interval_secs",
            "must be non-zero",
        ));
    }
}

fn check_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = value.parse::<url::Url>() {
        errors.push(ValidationError::new(field, format!("invalid URL: {}", e)));
    }
}

fn check_address(field: &str, value: Address, errors: &mut Vec<ValidationError>) {
    if value == Address::ZERO {
        errors.push(ValidationError::new(field, "is required"));
    }
}
