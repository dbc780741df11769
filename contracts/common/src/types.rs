//! Core Types for the Price Oracle
//!
//! Identities, the persisted price record and the instruction set.

use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{layout, tags};
use crate::errors::{OracleError, OracleResult};

// ============ Identity ============

/// 32-byte identity used for public keys, record addresses and program ids
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Address([u8; 32]);

impl Address {
    /// Wraps raw key bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Borrows the raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Base58, the way wallets and explorers print keys
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// First 8 bytes of `sha256("<namespace>:<name>")`
pub fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

// ============ Price Record ============

/// Persisted price feed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceRecord {
    /// Only identity allowed to update the price
    pub authority: Address,
    /// Price scaled by `10^decimals` (e.g., 2197 = $21.97 at 2 decimals)
    pub price: u64,
    /// Decimal places of `price`
    pub decimals: u8,
    /// Bump that re-derives this record's address
    pub bump: u8,
}

impl PriceRecord {
    /// Serialized body length, discriminator excluded
    pub const LEN: usize = layout::PRICE_RECORD_LEN;

    /// Full persisted size
    pub const SPACE: usize = layout::PRICE_RECORD_SPACE;

    /// Type tag written before the body
    pub const DISCRIMINATOR: [u8; 8] = layout::PRICE_RECORD_DISCRIMINATOR;

    /// Creates a new record
    pub fn new(authority: Address, price: u64, decimals: u8, bump: u8) -> Self {
        Self {
            authority,
            price,
            decimals,
            bump,
        }
    }

    /// Exact identity comparison against the stored authority
    pub fn is_authority(&self, signer: &Address) -> bool {
        self.authority == *signer
    }

    /// Encode as `discriminator | borsh(body)`
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SPACE);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        data.extend_from_slice(&borsh::to_vec(self).unwrap_or_default());
        data
    }

    /// Decode persisted bytes, checking size and discriminator
    pub fn try_from_account_data(data: &[u8]) -> OracleResult<Self> {
        if data.len() != Self::SPACE {
            return Err(OracleError::InvalidRecordData {
                reason: "unexpected length",
            });
        }

        let (tag, body) = data.split_at(layout::DISCRIMINATOR_LEN);
        if tag != Self::DISCRIMINATOR {
            return Err(OracleError::InvalidRecordData {
                reason: "discriminator mismatch",
            });
        }

        borsh::from_slice(body).map_err(|_| OracleError::InvalidRecordData {
            reason: "malformed body",
        })
    }

    /// Render the scaled price with its decimal point, e.g. `21.97`
    pub fn ui_price(&self) -> String {
        let digits = self.price.to_string();
        let decimals = self.decimals as usize;
        if decimals == 0 {
            return digits;
        }

        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        format!("{whole}.{frac}")
    }
}

// ============ Instructions ============

/// Actions for the price oracle program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleAction {
    /// Create the record with the signer as authority
    Initialize { initial_price: u64, decimals: u8 },
    /// Replace the price (authority only)
    UpdatePrice { new_price: u64 },
    /// Publish the current record as an event
    GetPrice,
}

impl OracleAction {
    /// Instruction name as it appears in logs and sighashes
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::UpdatePrice { .. } => "update_price",
            Self::GetPrice => "get_price",
        }
    }

    /// Encode as `sighash | borsh(args)`
    pub fn to_bytes(&self) -> Vec<u8> {
        let (tag, args) = match self {
            Self::Initialize {
                initial_price,
                decimals,
            } => (
                tags::INITIALIZE,
                borsh::to_vec(&(*initial_price, *decimals)).unwrap_or_default(),
            ),
            Self::UpdatePrice { new_price } => (
                tags::UPDATE_PRICE,
                borsh::to_vec(new_price).unwrap_or_default(),
            ),
            Self::GetPrice => (tags::GET_PRICE, Vec::new()),
        };

        let mut data = Vec::with_capacity(tag.len() + args.len());
        data.extend_from_slice(&tag);
        data.extend_from_slice(&args);
        data
    }

    /// Decode instruction bytes
    pub fn try_from_bytes(data: &[u8]) -> OracleResult<Self> {
        if data.len() < layout::DISCRIMINATOR_LEN {
            return Err(OracleError::InvalidInstructionData);
        }
        let (tag, args) = data.split_at(layout::DISCRIMINATOR_LEN);

        let action = if tag == tags::INITIALIZE {
            let (initial_price, decimals) = borsh::from_slice::<(u64, u8)>(args)
                .map_err(|_| OracleError::InvalidInstructionData)?;
            Self::Initialize {
                initial_price,
                decimals,
            }
        } else if tag == tags::UPDATE_PRICE {
            let new_price =
                borsh::from_slice::<u64>(args).map_err(|_| OracleError::InvalidInstructionData)?;
            Self::UpdatePrice { new_price }
        } else if tag == tags::GET_PRICE {
            if !args.is_empty() {
                return Err(OracleError::InvalidInstructionData);
            }
            Self::GetPrice
        } else {
            return Err(OracleError::InvalidInstructionData);
        };

        Ok(action)
    }
}
