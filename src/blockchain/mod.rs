//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! WALLET_PK (environment)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contracts.rs (ERC-20 and reward-pool call encoding)
//!     → transaction.rs (fresh nonce, sign, broadcast, confirm)
//!     → gateway.rs (ChainClient seam used by the orchestrator)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Gas limit and gas price are fixed configuration, never estimated

pub mod amount;
pub mod client;
pub mod contracts;
pub mod gateway;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use amount::TokenAmount;
pub use client::BlockchainClient;
pub use gateway::{ChainClient, EvmChain};
pub use types::{ChainConfig, ChainError, ChainResult, Receipt, TxHandle, TxKind, TxPayload};
pub use wallet::Wallet;
