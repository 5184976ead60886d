//! Token-denominated amounts.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};

/// An integer amount in a token's smallest unit, tagged with that token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: U256,
}

impl TokenAmount {
    pub fn new(token: Address, amount: U256) -> Self {
        Self { token, amount }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Whether this amount is at least `required`.
    ///
    /// Amounts of different tokens never cover each other.
    pub fn covers(&self, required: &TokenAmount) -> bool {
        self.token == required.token && self.amount >= required.amount
    }

    /// Human-readable amount using the token's decimals.
    pub fn display(&self, decimals: u8) -> String {
        format_units(self.amount, decimals).unwrap_or_else(|_| self.amount.to_string())
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.amount, self.token)
    }
}

/// Serde helpers for `U256` values that upstream services send as decimal
/// strings (and occasionally as plain JSON numbers).
pub mod decimal_u256 {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(U256::from(n)),
            Raw::Text(s) => parse(&s).map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Parse a decimal string, or a `0x`-prefixed hex string.
    pub fn parse(s: &str) -> Result<U256, String> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(s, 10),
        };
        parsed.map_err(|e| format!("invalid amount '{}': {}", s, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde::Deserialize;

    const WXM: Address = address!("b6093b61544572ab42a0e43af08abafd41bf25a6");
    const WETH: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

    #[test]
    fn test_covers_same_token() {
        let allowance = TokenAmount::new(WXM, U256::from(1_000u64));
        assert!(allowance.covers(&TokenAmount::new(WXM, U256::from(1_000u64))));
        assert!(allowance.covers(&TokenAmount::new(WXM, U256::from(999u64))));
        assert!(!allowance.covers(&TokenAmount::new(WXM, U256::from(1_001u64))));
    }

    #[test]
    fn test_covers_never_mixes_tokens() {
        let allowance = TokenAmount::new(WXM, U256::MAX);
        assert!(!allowance.covers(&TokenAmount::new(WETH, U256::from(1u64))));
    }

    #[test]
    fn test_display_with_decimals() {
        let amount = TokenAmount::new(WXM, U256::from(1_500_000_000_000_000_000u128));
        assert!(amount.display(18).starts_with("1.5"));
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(with = "decimal_u256")]
        value: U256,
    }

    #[test]
    fn test_decimal_u256_accepts_strings_and_numbers() {
        let h: Holder = serde_json::from_str(r#"{"value":"123456789012345678901234567890"}"#).unwrap();
        assert_eq!(h.value.to_string(), "123456789012345678901234567890");

        let h: Holder = serde_json::from_str(r#"{"value":42}"#).unwrap();
        assert_eq!(h.value, U256::from(42u64));

        let h: Holder = serde_json::from_str(r#"{"value":"0xff"}"#).unwrap();
        assert_eq!(h.value, U256::from(255u64));

        assert!(serde_json::from_str::<Holder>(r#"{"value":"12ab"}"#).is_err());
    }
}
