//! Error Types for the Price Oracle
//!
//! Every failure carries a stable numeric code. Clients match on
//! `number()`, so existing assignments must never be reordered.

use thiserror::Error;

use crate::constants::errors::ERROR_CODE_OFFSET;
use crate::types::Address;

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Main error enum for all oracle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    // ============ Authorization Errors ============
    /// Signer is not the authority stored in the record
    #[error("Invalid authority to perform this action.")]
    InvalidAuthority { expected: Address, actual: Address },

    // ============ Record Errors ============
    /// A record already exists at the derived address
    #[error("price record already initialized at {address}")]
    AlreadyInitialized { address: Address },

    /// Supplied address does not match the derived address
    #[error("address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: Address, actual: Address },

    /// No record exists at the supplied address
    #[error("no price record at {address}")]
    RecordNotFound { address: Address },

    /// Stored bytes are not a price record
    #[error("invalid price record data: {reason}")]
    InvalidRecordData { reason: &'static str },

    // ============ Input Errors ============
    /// Instruction bytes could not be decoded
    #[error("invalid instruction data")]
    InvalidInstructionData,

    // ============ Derivation Errors ============
    /// Too many seeds, or a seed longer than allowed
    #[error("length of the seed is too long for address generation")]
    MaxSeedLengthExceeded,

    /// Seeds hash to a point on the curve
    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,

    /// Every bump produced an on-curve address
    #[error("unable to find a viable program address bump seed")]
    NoViableBump,
}

impl OracleError {
    /// Stable numeric error code
    pub fn number(&self) -> u32 {
        ERROR_CODE_OFFSET
            + match self {
                Self::InvalidAuthority { .. } => 0,
                Self::AlreadyInitialized { .. } => 1,
                Self::AddressMismatch { .. } => 2,
                Self::RecordNotFound { .. } => 3,
                Self::InvalidRecordData { .. } => 4,
                Self::InvalidInstructionData => 5,
                Self::MaxSeedLengthExceeded => 6,
                Self::InvalidSeeds => 7,
                Self::NoViableBump => 8,
            }
    }

    /// Returns the error name clients see next to the number
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAuthority { .. } => "InvalidAuthority",
            Self::AlreadyInitialized { .. } => "AlreadyInitialized",
            Self::AddressMismatch { .. } => "AddressMismatch",
            Self::RecordNotFound { .. } => "RecordNotFound",
            Self::InvalidRecordData { .. } => "InvalidRecordData",
            Self::InvalidInstructionData => "InvalidInstructionData",
            Self::MaxSeedLengthExceeded => "MaxSeedLengthExceeded",
            Self::InvalidSeeds => "InvalidSeeds",
            Self::NoViableBump => "NoViableBump",
        }
    }

    /// Returns true if the caller can fix the request and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AddressMismatch { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidInstructionData
        )
    }
}
