use crate::errors::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 20-byte EVM address, stored lowercase with the `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parses a `0x`-prefixed 40-digit hex address, in any case.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| DomainError::InvalidAddress(raw.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Returns the lowercase `0x` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a position NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub U256);

impl From<u64> for TokenId {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw token amount in the token's smallest unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    /// Returns a zero amount.
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `floor(self * fraction)`. Fractions outside `(0, 1]` are clamped.
    pub fn fraction(&self, fraction: Decimal) -> Self {
        Self(crate::math::amount::scale_by_fraction(self.0, fraction))
    }

    /// Subtracts, stopping at zero.
    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Adds, stopping at `U256::MAX`.
    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalizes_case() {
        let a = Address::parse("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1").unwrap();
        assert_eq!(a.as_str(), "0x82af49447d8a07e3bd95bd0d56f35241523fbab1");
    }

    #[test]
    fn test_address_rejects_garbage() {
        assert!(Address::parse("82af49447d8a07e3bd95bd0d56f35241523fbab1").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzzaf49447d8a07e3bd95bd0d56f35241523fbab1").is_err());
    }

    #[test]
    fn test_address_deserializes_from_string() {
        let a: Address =
            serde_json::from_str("\"0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8\"").unwrap();
        assert_eq!(a.as_str(), "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8");
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }
}
