//! Recording test doubles for the orchestrator's collaborators.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use station_keeper::blockchain::contracts::ApproveCall;
use station_keeper::blockchain::{
    ChainClient, ChainError, ChainResult, Receipt, TokenAmount, TxHandle, TxKind, TxPayload,
};
use station_keeper::notify::{Notifier, NotifyError};
use station_keeper::rewards::{RewardClaim, RewardsFetchError, RewardsLedger};
use station_keeper::swap::{SwapAggregator, SwapError, SwapQuote, SwapSide};

// ---------------------------------------------------------------------------
// Rewards ledger
// ---------------------------------------------------------------------------

pub struct FakeLedger {
    claim: Mutex<Option<RewardClaim>>,
    calls: Mutex<usize>,
}

impl FakeLedger {
    pub fn new(claim: RewardClaim) -> Self {
        Self {
            claim: Mutex::new(Some(claim)),
            calls: Mutex::new(0),
        }
    }

    /// A ledger whose every fetch fails.
    pub fn unavailable() -> Self {
        Self {
            claim: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn set_claim(&self, claim: RewardClaim) {
        *self.claim.lock().unwrap() = Some(claim);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RewardsLedger for FakeLedger {
    async fn fetch_claim(&self, _address: Address) -> Result<RewardClaim, RewardsFetchError> {
        *self.calls.lock().unwrap() += 1;
        self.claim.lock().unwrap().clone().ok_or_else(|| RewardsFetchError {
            status: Some(reqwest::StatusCode::SERVICE_UNAVAILABLE),
            message: "ledger down".to_string(),
        })
    }
}

/// Claim with nothing available.
pub fn empty_claim() -> RewardClaim {
    RewardClaim {
        proof: Vec::new(),
        cumulative_amount: U256::from(5_000_000u64),
        cycle: 7,
        available: U256::ZERO,
        total_claimed: U256::from(5_000_000u64),
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    BalanceRead { token: Address },
    AllowanceRead { token: Address, spender: Address },
    Submitted { kind: TxKind, nonce: u64, to: Address, data: Bytes },
    Confirmed { kind: TxKind, tx_hash: TxHash },
}

#[derive(Default)]
struct ChainState {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    /// Nonce the node would report: one per mined transaction.
    mined: u64,
    hashes: u8,
    pending: HashMap<TxHash, TxPayload>,
    claim_credit: Option<(Address, U256)>,
    rejected: HashSet<TxKind>,
    reverted: HashSet<TxKind>,
    timed_out: HashSet<TxKind>,
    events: Vec<ChainEvent>,
}

/// In-memory chain: claims credit a balance, approvals set allowances,
/// swaps drain balances. Nonces only advance when a transaction is mined.
pub struct FakeChain {
    sender: Address,
    state: Mutex<ChainState>,
}

impl FakeChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            state: Mutex::new(ChainState::default()),
        }
    }

    pub fn with_balance(self, token: Address, amount: u64) -> Self {
        self.state.lock().unwrap().balances.insert(token, U256::from(amount));
        self
    }

    pub fn with_allowance(self, token: Address, spender: Address, amount: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, spender), U256::from(amount));
        self
    }

    /// Credit `amount` of `token` when a claim is mined.
    pub fn with_claim_credit(self, token: Address, amount: u64) -> Self {
        self.state.lock().unwrap().claim_credit = Some((token, U256::from(amount)));
        self
    }

    /// Refuse to broadcast transactions of `kind`.
    pub fn rejecting(self, kind: TxKind) -> Self {
        self.state.lock().unwrap().rejected.insert(kind);
        self
    }

    /// Mine transactions of `kind` with a failed status.
    pub fn reverting(self, kind: TxKind) -> Self {
        self.state.lock().unwrap().reverted.insert(kind);
        self
    }

    /// Never confirm transactions of `kind` within the wait.
    pub fn timing_out(self, kind: TxKind) -> Self {
        self.state.lock().unwrap().timed_out.insert(kind);
        self
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn submissions(&self) -> Vec<(TxKind, u64, Bytes)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChainEvent::Submitted { kind, nonce, data, .. } => Some((kind, nonce, data)),
                _ => None,
            })
            .collect()
    }

    pub fn submitted_kinds(&self) -> Vec<TxKind> {
        self.submissions().into_iter().map(|(kind, _, _)| kind).collect()
    }

    pub fn balance(&self, token: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn get_balance(&self, token: Address, _owner: Address) -> ChainResult<TokenAmount> {
        let mut state = self.state.lock().unwrap();
        state.events.push(ChainEvent::BalanceRead { token });
        let amount = state.balances.get(&token).copied().unwrap_or_default();
        Ok(TokenAmount::new(token, amount))
    }

    async fn get_allowance(
        &self,
        token: Address,
        _owner: Address,
        spender: Address,
    ) -> ChainResult<TokenAmount> {
        let mut state = self.state.lock().unwrap();
        state.events.push(ChainEvent::AllowanceRead { token, spender });
        let amount = state
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or_default();
        Ok(TokenAmount::new(token, amount))
    }

    async fn submit_transaction(&self, payload: TxPayload) -> ChainResult<TxHandle> {
        let mut state = self.state.lock().unwrap();
        if state.rejected.contains(&payload.kind) {
            return Err(ChainError::Submission {
                kind: payload.kind,
                reason: "insufficient funds for gas".to_string(),
            });
        }

        state.hashes += 1;
        let tx_hash = TxHash::with_last_byte(state.hashes);
        let nonce = state.mined;
        state.events.push(ChainEvent::Submitted {
            kind: payload.kind,
            nonce,
            to: payload.to,
            data: payload.data.clone(),
        });
        let kind = payload.kind;
        state.pending.insert(tx_hash, payload);

        Ok(TxHandle {
            kind,
            tx_hash,
            nonce,
            gas_limit: 500_000,
            gas_price: 100_000_000,
        })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> ChainResult<Receipt> {
        let mut state = self.state.lock().unwrap();
        let timeout = ChainError::TransactionTimeout {
            kind: handle.kind,
            tx_hash: handle.tx_hash,
            secs: 300,
        };
        if state.timed_out.contains(&handle.kind) {
            return Err(timeout);
        }
        let payload = state.pending.remove(&handle.tx_hash).ok_or(timeout)?;
        state.mined += 1;

        if state.reverted.contains(&payload.kind) {
            return Err(ChainError::TransactionFailed {
                kind: payload.kind,
                tx_hash: handle.tx_hash,
            });
        }

        match payload.kind {
            TxKind::Claim => {
                if let Some((token, amount)) = state.claim_credit {
                    *state.balances.entry(token).or_default() += amount;
                }
            }
            TxKind::Approve => {
                let call = ApproveCall::abi_decode(&payload.data).unwrap();
                state.allowances.insert((payload.to, call.spender), call.amount);
            }
            TxKind::Swap => state.balances.clear(),
        }

        state.events.push(ChainEvent::Confirmed {
            kind: payload.kind,
            tx_hash: handle.tx_hash,
        });
        Ok(Receipt {
            tx_hash: handle.tx_hash,
            block_number: 100 + state.mined,
            gas_used: 21_000,
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregatorCall {
    Quote { amount: U256 },
    TransferProxy,
    Build { amount: U256, receiver: Address },
}

/// Quotes at a fixed 1:2 rate.
pub struct FakeAggregator {
    pub router: Address,
    transfer_proxy: Option<Address>,
    requote_proxy: Option<Address>,
    fallback_proxy: Address,
    expire_on_build: bool,
    calls: Mutex<Vec<AggregatorCall>>,
}

impl FakeAggregator {
    pub fn new(router: Address, transfer_proxy: Address) -> Self {
        Self {
            router,
            transfer_proxy: Some(transfer_proxy),
            requote_proxy: None,
            fallback_proxy: transfer_proxy,
            expire_on_build: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Quotes omit the transfer proxy; it must be looked up separately.
    pub fn without_proxy_in_quote(mut self) -> Self {
        self.transfer_proxy = None;
        self
    }

    /// Quotes after the first name `proxy` as the transfer proxy.
    pub fn moving_proxy_to(mut self, proxy: Address) -> Self {
        self.requote_proxy = Some(proxy);
        self
    }

    pub fn expiring(mut self) -> Self {
        self.expire_on_build = true;
        self
    }

    pub fn calls(&self) -> Vec<AggregatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn quote_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AggregatorCall::Quote { .. }))
            .count()
    }
}

#[async_trait]
impl SwapAggregator for FakeAggregator {
    async fn get_quote(
        &self,
        source: Address,
        destination: Address,
        amount: U256,
        side: SwapSide,
    ) -> Result<SwapQuote, SwapError> {
        let mut calls = self.calls.lock().unwrap();
        let first = !calls.iter().any(|c| matches!(c, AggregatorCall::Quote { .. }));
        calls.push(AggregatorCall::Quote { amount });
        let transfer_proxy = match self.requote_proxy {
            Some(proxy) if !first => Some(proxy),
            _ => self.transfer_proxy,
        };
        Ok(SwapQuote {
            side,
            source: TokenAmount::new(source, amount),
            destination: TokenAmount::new(destination, amount * U256::from(2u64)),
            transfer_proxy,
            route: serde_json::json!({ "srcAmount": amount.to_string() }),
        })
    }

    async fn get_transfer_proxy(&self) -> Result<Address, SwapError> {
        self.calls.lock().unwrap().push(AggregatorCall::TransferProxy);
        Ok(self.fallback_proxy)
    }

    async fn build_swap_transaction(
        &self,
        quote: &SwapQuote,
        receiver: Address,
    ) -> Result<TxPayload, SwapError> {
        self.calls.lock().unwrap().push(AggregatorCall::Build {
            amount: quote.source.amount,
            receiver,
        });
        if self.expire_on_build {
            return Err(SwapError::QuoteExpired("Rate has changed, re-query the lastest Price".to_string()));
        }
        Ok(TxPayload::call(TxKind::Swap, self.router, Bytes::from_static(b"swap")))
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeNotifier {
    fail: bool,
    messages: Mutex<Vec<String>>,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(NotifyError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "chat not found".to_string(),
            });
        }
        Ok(())
    }
}
