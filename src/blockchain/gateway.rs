//! The chain operations the claim-and-swap pipeline depends on.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::blockchain::amount::TokenAmount;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contracts;
use crate::blockchain::transaction::TxSubmitter;
use crate::blockchain::types::{ChainError, ChainResult, Receipt, TxHandle, TxPayload};
use crate::blockchain::wallet::Wallet;

/// Token reads plus transaction submission for the keeper wallet.
///
/// Reads are side-effect free. Submissions are not idempotent: every call
/// to [`ChainClient::submit_transaction`] broadcasts a new transaction.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address that signs every submission.
    fn sender(&self) -> Address;

    async fn get_balance(&self, token: Address, owner: Address) -> ChainResult<TokenAmount>;

    async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<TokenAmount>;

    /// Fetch a fresh nonce, sign and broadcast `payload`.
    async fn submit_transaction(&self, payload: TxPayload) -> ChainResult<TxHandle>;

    /// Wait, bounded, until `handle` is mined.
    async fn await_confirmation(&self, handle: &TxHandle) -> ChainResult<Receipt>;
}

/// [`ChainClient`] backed by a JSON-RPC node.
#[derive(Clone)]
pub struct EvmChain {
    submitter: TxSubmitter,
}

impl EvmChain {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self {
            submitter: TxSubmitter::new(client, wallet),
        }
    }

    async fn read_uint(
        &self,
        call: &'static str,
        token: Address,
        data: alloy::primitives::Bytes,
    ) -> ChainResult<TokenAmount> {
        let output = self.submitter.client().call(token, data).await?;
        let amount = contracts::decode_uint_return(call, &output)
            .map_err(|reason| ChainError::Decode { call, reason })?;
        Ok(TokenAmount::new(token, amount))
    }
}

#[async_trait]
impl ChainClient for EvmChain {
    fn sender(&self) -> Address {
        self.submitter.address()
    }

    async fn get_balance(&self, token: Address, owner: Address) -> ChainResult<TokenAmount> {
        self.read_uint("balanceOf", token, contracts::balance_of_calldata(owner))
            .await
    }

    async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<TokenAmount> {
        self.read_uint("allowance", token, contracts::allowance_calldata(owner, spender))
            .await
    }

    async fn submit_transaction(&self, payload: TxPayload) -> ChainResult<TxHandle> {
        self.submitter.submit(&payload).await
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> ChainResult<Receipt> {
        self.submitter.wait_for_confirmation(handle).await
    }
}

impl std::fmt::Debug for EvmChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmChain")
            .field("client", self.submitter.client())
            .field("sender", &self.submitter.address())
            .finish()
    }
}
