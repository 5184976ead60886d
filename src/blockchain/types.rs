//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was mined but reverted.
    #[error("{kind} transaction {tx_hash} reverted")]
    TransactionFailed { kind: TxKind, tx_hash: TxHash },

    /// Transaction was not mined before the confirmation deadline.
    #[error("{kind} transaction {tx_hash} not confirmed after {secs} seconds")]
    TransactionTimeout {
        kind: TxKind,
        tx_hash: TxHash,
        secs: u64,
    },

    /// Building, signing or broadcasting a transaction failed.
    #[error("{kind} transaction rejected: {reason}")]
    Submission { kind: TxKind, reason: String },

    /// Return data of a contract read could not be decoded.
    #[error("Failed to decode {call} result: {reason}")]
    Decode { call: &'static str, reason: String },

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// The three write operations the keeper issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Claim,
    Approve,
    Swap,
}

impl TxKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Claim => "claim",
            TxKind::Approve => "approve",
            TxKind::Swap => "swap",
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract call ready to be signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxPayload {
    /// What the transaction does.
    pub kind: TxKind,
    /// Destination contract.
    pub to: Address,
    /// ABI-encoded call data.
    pub data: Bytes,
    /// Native value attached to the call.
    pub value: U256,
}

impl TxPayload {
    /// Payload with no native value attached.
    pub fn call(kind: TxKind, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }
}

/// A broadcast transaction awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle {
    pub kind: TxKind,
    pub tx_hash: TxHash,
    /// Nonce the transaction was signed with.
    pub nonce: u64,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
}

/// Outcome of a mined, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
}
