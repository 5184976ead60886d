//! Run outcomes and errors.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

use crate::blockchain::{ChainError, TokenAmount};
use crate::rewards::RewardsFetchError;
use crate::swap::SwapError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchClaim,
    SkipClaim,
    SubmitClaim,
    ConfirmClaim,
    CheckBalance,
    GetQuote,
    CheckAllowance,
    Approve,
    ConfirmApprove,
    BuildSwapTx,
    SubmitSwap,
    ConfirmSwap,
    Notify,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::FetchClaim => "FETCH_CLAIM",
            Stage::SkipClaim => "SKIP_CLAIM",
            Stage::SubmitClaim => "SUBMIT_CLAIM",
            Stage::ConfirmClaim => "CONFIRM_CLAIM",
            Stage::CheckBalance => "CHECK_BALANCE",
            Stage::GetQuote => "GET_QUOTE",
            Stage::CheckAllowance => "CHECK_ALLOWANCE",
            Stage::Approve => "APPROVE",
            Stage::ConfirmApprove => "CONFIRM_APPROVE",
            Stage::BuildSwapTx => "BUILD_SWAP_TX",
            Stage::SubmitSwap => "SUBMIT_SWAP",
            Stage::ConfirmSwap => "CONFIRM_SWAP",
            Stage::Notify => "NOTIFY",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// What happened to the claim half of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The ledger reported nothing available.
    NothingToClaim,
    Claimed { amount: U256, tx_hash: TxHash },
    /// Submission or confirmation failed; the run went on to the swap.
    Failed {
        tx_hash: Option<TxHash>,
        reason: String,
    },
}

/// What happened to the swap half of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Source token balance was zero.
    NoBalance,
    Swapped {
        sold: TokenAmount,
        /// Destination amount the executed quote promised.
        quoted: TokenAmount,
        tx_hash: TxHash,
        /// Approval issued in this run, if one was needed.
        approval_tx: Option<TxHash>,
    },
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub claim: ClaimOutcome,
    pub swap: SwapOutcome,
}

/// A failure that ended a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    RewardsFetch(#[from] RewardsFetchError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Swap(#[from] SwapError),
}

impl RunError {
    /// Hash of the transaction involved, if the failure concerns one.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            RunError::Chain(ChainError::TransactionFailed { tx_hash, .. })
            | RunError::Chain(ChainError::TransactionTimeout { tx_hash, .. }) => Some(*tx_hash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::TxKind;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::CheckAllowance.to_string(), "CHECK_ALLOWANCE");
        assert_eq!(Stage::Done.to_string(), "DONE");
    }

    #[test]
    fn test_run_error_exposes_tx_hash() {
        let hash = TxHash::repeat_byte(0x42);
        let err = RunError::from(ChainError::TransactionFailed {
            kind: TxKind::Swap,
            tx_hash: hash,
        });
        assert_eq!(err.tx_hash(), Some(hash));

        let err = RunError::from(SwapError::QuoteExpired("rate has changed".to_string()));
        assert_eq!(err.tx_hash(), None);
        assert_eq!(err.to_string(), "quote expired: rate has changed");
    }
}
