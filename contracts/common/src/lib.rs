//! Price Oracle Common Library
//!
//! Shared types, constants, and utilities for the price feed oracle.
//!
//! ## Records Live at Derived Addresses
//!
//! A price record is never stored at an address the caller picks. Its
//! location is derived from a seed and the program id:
//!
//! ```text
//! seed ("price_feed_v1") + program id --find_program_address--> (address, bump)
//! ```
//!
//! Any client can run the same derivation to locate the record, and the
//! program re-runs it (with the stored bump) on every access.
//!
//! ## Modules
//!
//! - **constants**: seeds, program id, layout sizes and tags
//! - **errors**: the error taxonomy with stable numeric codes
//! - **types**: `Address`, `PriceRecord`, `OracleAction`
//! - **derivation**: program derived address search and validation
//! - **events**: `PriceInfo` events and the per-instruction `EventLog`

pub mod constants;
pub mod derivation;
pub mod errors;
pub mod events;
pub mod types;


// Re-exports for convenience
pub use derivation::{create_program_address, find_program_address, AddressDeriver, ProgramDerivation};
pub use errors::*;
pub use events::*;
pub use types::*;
