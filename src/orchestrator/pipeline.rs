//! The claim-and-swap run.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::contracts;
use crate::blockchain::{ChainClient, TokenAmount};
use crate::config::KeeperConfig;
use crate::lifecycle::scheduler::{Job, JobError};
use crate::notify::Notifier;
use crate::orchestrator::report::{ClaimOutcome, RunError, RunReport, Stage, SwapOutcome};
use crate::rewards::{RewardClaim, RewardsLedger};
use crate::swap::{SwapAggregator, SwapError, SwapQuote, SwapSide};

/// Addresses and display settings for one claim-and-swap pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub claim_contract: Address,
    pub source_token: Address,
    pub destination_token: Address,
    /// Swap output recipient; the sender when `None`.
    pub receiver: Option<Address>,
    pub source_decimals: u8,
    pub destination_decimals: u8,
    pub source_symbol: String,
    pub destination_symbol: String,
    pub explorer_tx_url: String,
}

impl PipelineSettings {
    pub fn from_config(config: &KeeperConfig) -> Self {
        let claim = &config.claim;
        Self {
            claim_contract: claim.contract_address,
            source_token: claim.source_token,
            destination_token: claim.destination_token,
            receiver: claim.receiver,
            source_decimals: claim.source_decimals,
            destination_decimals: claim.destination_decimals,
            source_symbol: claim.source_symbol.clone(),
            destination_symbol: claim.destination_symbol.clone(),
            explorer_tx_url: config.notifier.explorer_tx_url.clone(),
        }
    }
}

/// Claims accrued rewards, then sells the reward token balance.
///
/// Not safe to run concurrently against one wallet; the scheduler's
/// in-flight guard serializes runs.
pub struct ClaimAndSwap {
    settings: PipelineSettings,
    ledger: Arc<dyn RewardsLedger>,
    chain: Arc<dyn ChainClient>,
    aggregator: Arc<dyn SwapAggregator>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ClaimAndSwap {
    pub fn new(
        settings: PipelineSettings,
        ledger: Arc<dyn RewardsLedger>,
        chain: Arc<dyn ChainClient>,
        aggregator: Arc<dyn SwapAggregator>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            settings,
            ledger,
            chain,
            aggregator,
            notifier,
        }
    }

    /// Execute one run.
    ///
    /// A ledger failure aborts before anything is written. A claim failure
    /// is recorded in the report and the swap is still attempted. Any swap
    /// failure ends the run; the next scheduled run starts over.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let sender = self.chain.sender();

        tracing::info!(stage = %Stage::FetchClaim, address = %sender, "Fetching reward claim");
        let claim = self.ledger.fetch_claim(sender).await?;

        let claim = self.claim(&claim).await;
        let swap = self.swap(sender).await?;

        tracing::info!(stage = %Stage::Done, claim = ?claim, swap = ?swap, "Claim-and-swap run finished");
        Ok(RunReport { claim, swap })
    }

    async fn claim(&self, claim: &RewardClaim) -> ClaimOutcome {
        if !claim.has_claimable() {
            tracing::info!(stage = %Stage::SkipClaim, cycle = claim.cycle, "No rewards available to claim");
            return ClaimOutcome::NothingToClaim;
        }

        tracing::info!(
            stage = %Stage::SubmitClaim,
            amount = %claim.available,
            cumulative = %claim.cumulative_amount,
            cycle = claim.cycle,
            proof_len = claim.proof.len(),
            "Submitting claim"
        );
        let payload = contracts::claim_payload(self.settings.claim_contract, claim);
        let handle = match self.chain.submit_transaction(payload).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(stage = %Stage::SubmitClaim, error = %e, "Claim submission failed");
                return ClaimOutcome::Failed {
                    tx_hash: None,
                    reason: e.to_string(),
                };
            }
        };

        tracing::info!(stage = %Stage::ConfirmClaim, tx_hash = %handle.tx_hash, "Awaiting claim confirmation");
        match self.chain.await_confirmation(&handle).await {
            Ok(receipt) => {
                tracing::info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "Claim confirmed");
                ClaimOutcome::Claimed {
                    amount: claim.available,
                    tx_hash: receipt.tx_hash,
                }
            }
            Err(e) => {
                tracing::error!(
                    stage = %Stage::ConfirmClaim,
                    tx_hash = %handle.tx_hash,
                    error = %e,
                    "Claim not confirmed"
                );
                ClaimOutcome::Failed {
                    tx_hash: Some(handle.tx_hash),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn swap(&self, sender: Address) -> Result<SwapOutcome, RunError> {
        let source = self.settings.source_token;

        tracing::info!(stage = %Stage::CheckBalance, token = %source, owner = %sender, "Reading balance");
        let balance = self.chain.get_balance(source, sender).await?;
        if balance.is_zero() {
            tracing::info!("No source token balance to trade");
            return Ok(SwapOutcome::NoBalance);
        }
        tracing::info!(balance = %balance.amount, "Source token balance");

        let mut quote = self.quote(balance.amount).await?;
        let spender = self.spender(&quote).await?;

        tracing::info!(stage = %Stage::CheckAllowance, spender = %spender, "Reading allowance");
        let allowance = self.chain.get_allowance(source, sender, spender).await?;

        let mut approval_tx = None;
        if !allowance.covers(&balance) {
            approval_tx = Some(self.approve(spender, &allowance, &balance).await?);
            // The approval wait outlived the first quote; price again so the
            // route handed to the builder is fresh.
            quote = self.quote(balance.amount).await?;

            let quoted = self.spender(&quote).await?;
            if quoted != spender {
                tracing::warn!(approved = %spender, quoted = %quoted, "Transfer proxy changed after approval");
                let allowance = self.chain.get_allowance(source, sender, quoted).await?;
                if !allowance.covers(&balance) {
                    return Err(SwapError::SpenderChanged {
                        approved: spender,
                        quoted,
                    }
                    .into());
                }
            }
        }

        let receiver = self.settings.receiver.unwrap_or(sender);
        tracing::info!(stage = %Stage::BuildSwapTx, receiver = %receiver, "Building swap transaction");
        let payload = self.aggregator.build_swap_transaction(&quote, receiver).await?;

        tracing::info!(stage = %Stage::SubmitSwap, to = %payload.to, amount = %quote.source.amount, "Submitting swap");
        let handle = self.chain.submit_transaction(payload).await?;

        tracing::info!(stage = %Stage::ConfirmSwap, tx_hash = %handle.tx_hash, "Awaiting swap confirmation");
        let receipt = self.chain.await_confirmation(&handle).await?;
        tracing::info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "Swap confirmed");

        self.notify_swap(&quote, receipt.tx_hash).await;

        Ok(SwapOutcome::Swapped {
            sold: quote.source,
            quoted: quote.destination,
            tx_hash: receipt.tx_hash,
            approval_tx,
        })
    }

    async fn quote(&self, amount: U256) -> Result<SwapQuote, RunError> {
        tracing::info!(stage = %Stage::GetQuote, amount = %amount, "Requesting quote");
        let quote = self
            .aggregator
            .get_quote(
                self.settings.source_token,
                self.settings.destination_token,
                amount,
                SwapSide::Sell,
            )
            .await?;
        Ok(quote)
    }

    /// Transfer proxy the swap will pull tokens through.
    async fn spender(&self, quote: &SwapQuote) -> Result<Address, RunError> {
        match quote.transfer_proxy {
            Some(proxy) if proxy != Address::ZERO => Ok(proxy),
            _ => Ok(self.aggregator.get_transfer_proxy().await?),
        }
    }

    async fn approve(
        &self,
        spender: Address,
        allowance: &TokenAmount,
        required: &TokenAmount,
    ) -> Result<TxHash, RunError> {
        tracing::info!(
            stage = %Stage::Approve,
            spender = %spender,
            allowance = %allowance.amount,
            required = %required.amount,
            "Allowance insufficient, approving"
        );
        let payload = contracts::approve_payload(required.token, spender, required.amount);
        let handle = self.chain.submit_transaction(payload).await?;

        tracing::info!(stage = %Stage::ConfirmApprove, tx_hash = %handle.tx_hash, "Awaiting approval confirmation");
        let receipt = self.chain.await_confirmation(&handle).await?;
        Ok(receipt.tx_hash)
    }

    async fn notify_swap(&self, quote: &SwapQuote, tx_hash: TxHash) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let message = format!(
            "Swapped {} {} to {} {} with tx hash: {}{}",
            quote.source.display(self.settings.source_decimals),
            self.settings.source_symbol,
            quote.destination.display(self.settings.destination_decimals),
            self.settings.destination_symbol,
            self.settings.explorer_tx_url,
            tx_hash
        );

        tracing::debug!(stage = %Stage::Notify, "Sending swap notification");
        if let Err(e) = notifier.notify(&message).await {
            tracing::warn!(error = %e, "Swap notification failed");
        }
    }
}

#[async_trait]
impl Job for ClaimAndSwap {
    fn name(&self) -> &'static str {
        "claim_and_swap"
    }

    async fn run_once(&self) -> Result<(), JobError> {
        match self.run().await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    tx_hash = ?e.tx_hash(),
                    sender = %self.chain.sender(),
                    source_token = %self.settings.source_token,
                    "Claim-and-swap run aborted"
                );
                Err(Box::new(e))
            }
        }
    }
}
