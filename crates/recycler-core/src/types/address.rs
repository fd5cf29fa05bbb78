//! # Addresses and Currencies

use std::fmt;
use std::str::FromStr;

use crate::errors::RecyclerError;

/// 20-byte account or contract address
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose last byte is `value`; handy for fixtures
    pub const fn from_low_u8(value: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = value;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = RecyclerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| RecyclerError::ConversionError)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| RecyclerError::ConversionError)?;
        Ok(Self(bytes))
    }
}

/// A pool currency, identified by its token address
///
/// The zero address is the chain's native asset.
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Currency(pub Address);

impl Currency {
    pub const NATIVE: Currency = Currency(Address::ZERO);

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Currency {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            self.0.fmt(f)
        }
    }
}

impl FromStr for Currency {
    type Err = RecyclerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::NATIVE);
        }
        Address::from_str(s).map(Self)
    }
}
