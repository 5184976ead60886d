//! Claim-and-swap orchestration.
//!
//! # State Machine
//! ```text
//! FETCH_CLAIM ─▶ (available == 0 ─▶ SKIP_CLAIM) ─▶ SUBMIT_CLAIM ─▶ CONFIRM_CLAIM
//!     ─▶ CHECK_BALANCE ─▶ (balance == 0 ─▶ DONE)
//!     ─▶ GET_QUOTE ─▶ CHECK_ALLOWANCE ─▶ (insufficient ─▶ APPROVE ─▶ CONFIRM_APPROVE ─▶ GET_QUOTE)
//!     ─▶ BUILD_SWAP_TX ─▶ SUBMIT_SWAP ─▶ CONFIRM_SWAP ─▶ NOTIFY ─▶ DONE
//! ```
//!
//! # Design Decisions
//! - Claim and swap are independent outcomes: a failed claim still lets the
//!   existing balance be swapped
//! - No in-run retries; the next scheduled run re-reads all state
//! - Balances and allowances are read at the point of each decision
//! - Notification failures never fail a run

pub mod pipeline;
pub mod report;

pub use pipeline::{ClaimAndSwap, PipelineSettings};
pub use report::{ClaimOutcome, RunError, RunReport, Stage, SwapOutcome};
