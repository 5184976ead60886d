//! Contract interfaces and call encoding.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::{TxKind, TxPayload};
use crate::rewards::RewardClaim;

sol! {
    /// Token reads and approval.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Merkle-proof reward pool.
    interface IRewardPool {
        function claim(uint256 amount, uint256 totalRewards, uint256 cycle, bytes32[] calldata proof) external;
    }
}

/// Decoded `approve` arguments.
pub type ApproveCall = IERC20::approveCall;

/// Decoded `claim` arguments.
pub type ClaimCall = IRewardPool::claimCall;

/// Encode `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

/// Encode `allowance(owner, spender)`.
pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

/// Decode the `uint256` returned by `balanceOf` or `allowance`.
pub fn decode_uint_return(call: &'static str, data: &[u8]) -> Result<U256, String> {
    // Both reads return a single uint256, so the balanceOf decoder serves both.
    IERC20::balanceOfCall::abi_decode_returns(data)
        .map_err(|e| format!("{} returned {} bytes: {}", call, data.len(), e))
}

/// Build the `approve(spender, amount)` transaction for `token`.
pub fn approve_payload(token: Address, spender: Address, amount: U256) -> TxPayload {
    let data = IERC20::approveCall { spender, amount }.abi_encode();
    TxPayload::call(TxKind::Approve, token, data)
}

/// Build the `claim(available, cumulative, cycle, proof)` transaction.
pub fn claim_payload(pool: Address, claim: &RewardClaim) -> TxPayload {
    let data = IRewardPool::claimCall {
        amount: claim.available,
        totalRewards: claim.cumulative_amount,
        cycle: U256::from(claim.cycle),
        proof: claim.proof.clone(),
    }
    .abi_encode();
    TxPayload::call(TxKind::Claim, pool, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{keccak256, B256};

    fn sample_claim() -> RewardClaim {
        RewardClaim {
            proof: vec![B256::repeat_byte(0xab), B256::repeat_byte(0xcd)],
            cumulative_amount: U256::from(5_000_000u64),
            cycle: 7,
            available: U256::from(1_000_000u64),
            total_claimed: U256::from(4_000_000u64),
        }
    }

    #[test]
    fn test_claim_selector() {
        let expected = &keccak256(b"claim(uint256,uint256,uint256,bytes32[])")[..4];
        assert_eq!(IRewardPool::claimCall::SELECTOR.as_slice(), expected);
    }

    #[test]
    fn test_claim_payload_round_trips_arguments() {
        let pool = Address::repeat_byte(0x11);
        let payload = claim_payload(pool, &sample_claim());
        assert_eq!(payload.kind, TxKind::Claim);
        assert_eq!(payload.to, pool);

        let decoded = IRewardPool::claimCall::abi_decode(&payload.data).unwrap();
        assert_eq!(decoded.amount, U256::from(1_000_000u64));
        assert_eq!(decoded.totalRewards, U256::from(5_000_000u64));
        assert_eq!(decoded.cycle, U256::from(7u64));
        assert_eq!(decoded.proof.len(), 2);
    }

    #[test]
    fn test_approve_payload_targets_token() {
        let token = Address::repeat_byte(0x22);
        let spender = Address::repeat_byte(0x33);
        let payload = approve_payload(token, spender, U256::from(10u64));
        assert_eq!(payload.to, token);
        assert_eq!(&payload.data[..4], &keccak256(b"approve(address,uint256)")[..4]);
    }

    #[test]
    fn test_decode_uint_return() {
        let word = U256::from(123_456u64).to_be_bytes::<32>();
        assert_eq!(decode_uint_return("balanceOf", &word).unwrap(), U256::from(123_456u64));
        assert!(decode_uint_return("balanceOf", &[0u8; 3]).is_err());
    }
}
