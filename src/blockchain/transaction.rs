//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build legacy transactions with the configured gas limit and price
//! - Fetch the nonce immediately before signing each transaction
//! - Sign and broadcast
//! - Monitor confirmations with a bounded wait

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{ChainError, ChainResult, Receipt, TxHandle, TxPayload};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// Signs and broadcasts keeper transactions.
#[derive(Clone)]
pub struct TxSubmitter {
    client: BlockchainClient,
    wallet: Wallet,
}

impl TxSubmitter {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build the transaction request for `payload` at `nonce`.
    pub fn build(&self, payload: &TxPayload, nonce: u64) -> TransactionRequest {
        let config = self.client.config();
        TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(payload.to)
            .with_value(payload.value)
            .with_input(payload.data.clone())
            .with_nonce(nonce)
            .with_gas_price(u128::from(config.gas_price_wei))
            .with_gas_limit(config.gas_limit)
            .with_chain_id(self.wallet.chain_id())
    }

    /// Sign and broadcast `payload`.
    ///
    /// The nonce is read from the node right here, never reused from an
    /// earlier submission in the same run.
    pub async fn submit(&self, payload: &TxPayload) -> ChainResult<TxHandle> {
        let nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        let request = self.build(payload, nonce);

        let envelope = request
            .build(&self.wallet.network_wallet())
            .await
            .map_err(|e| ChainError::Submission {
                kind: payload.kind,
                reason: format!("signing failed: {}", e),
            })?;

        let tx_hash = match self.client.send_transaction(payload.kind, envelope).await {
            Ok(hash) => hash,
            Err(e) => {
                metrics::record_transaction(payload.kind.as_str(), "rejected");
                return Err(e);
            }
        };
        metrics::record_transaction(payload.kind.as_str(), "submitted");

        let config = self.client.config();
        tracing::info!(
            kind = %payload.kind,
            tx_hash = %tx_hash,
            nonce = nonce,
            to = %payload.to,
            "Transaction sent"
        );

        Ok(TxHandle {
            kind: payload.kind,
            tx_hash,
            nonce,
            gas_limit: config.gas_limit,
            gas_price: u128::from(config.gas_price_wei),
        })
    }

    /// Wait for a transaction to be mined with the required confirmations.
    ///
    /// RPC errors while polling are tolerated until the deadline, so a node
    /// that stops answering surfaces as a timeout rather than a hang.
    pub async fn wait_for_confirmation(&self, handle: &TxHandle) -> ChainResult<Receipt> {
        let config = self.client.config();
        let required_confirmations = self.client.confirmation_blocks();
        let timeout_secs = config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(config.receipt_poll_interval_ms.max(1));
        let tx_hash = handle.tx_hash;

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(ChainError::TransactionFailed {
                        kind: handle.kind,
                        tx_hash,
                    });
                }

                let Some(tx_block) = receipt.block_number else {
                    tracing::debug!(tx_hash = %tx_hash, "Receipt has no block number yet");
                    continue;
                };
                if required_confirmations > 0 {
                    let current_block = match self.client.get_block_number().await {
                        Ok(n) => n,
                        Err(e) => {
                            tracing::warn!(tx_hash = %tx_hash, error = %e, "Block number lookup failed");
                            continue;
                        }
                    };
                    let confirmations = confirmations_since(tx_block, current_block);
                    if confirmations < required_confirmations {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            confirmations = confirmations,
                            required = required_confirmations,
                            "Waiting for confirmations"
                        );
                        continue;
                    }
                }

                return Ok(Receipt {
                    tx_hash,
                    block_number: tx_block,
                    gas_used: receipt.gas_used,
                });
            }
        })
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(_) => Err(ChainError::TransactionTimeout {
                kind: handle.kind,
                tx_hash,
                secs: timeout_secs,
            }),
        };

        let status = match &outcome {
            Ok(_) => "confirmed",
            Err(ChainError::TransactionFailed { .. }) => "reverted",
            Err(_) => "timeout",
        };
        metrics::record_transaction(handle.kind.as_str(), status);
        outcome
    }

    /// The underlying RPC client.
    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    /// Get the wallet address.
    pub fn address(&self) -> alloy::primitives::Address {
        self.wallet.address()
    }
}

/// Blocks mined on top of `included`, saturating at both ends.
fn confirmations_since(included: u64, current: u64) -> u32 {
    u32::try_from(current.saturating_sub(included)).unwrap_or(u32::MAX)
}
