//! Protocol Constants
//!
//! Fixed values shared by the oracle program and anything that needs to
//! locate or decode its records off-chain.

/// Program identity of the reference deployment
pub mod program {
    use crate::types::Address;

    /// `EUeWpzuAwmY13VNbVumpTJVZwmoUkrf1cujqKVGr7rRE`
    pub const PROGRAM_ID: Address = Address::new([
        200, 61, 7, 135, 37, 53, 76, 216, 25, 98, 119, 136, 126, 155, 71, 218, 184, 112, 152, 81,
        68, 111, 10, 19, 112, 118, 56, 235, 180, 246, 82, 193,
    ]);
}

/// Seeds used to locate price records
pub mod seeds {
    /// Seed of the reference price feed record
    pub const PRICE_FEED_SEED: &[u8] = b"price_feed_v1";
}

/// Address derivation limits
pub mod derivation {
    /// Maximum number of seeds (bump included)
    pub const MAX_SEEDS: usize = 16;

    /// Maximum length of a single seed in bytes
    pub const MAX_SEED_LEN: usize = 32;

    /// Domain separator appended after the program id
    pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
}

/// Persisted layout of a price record
pub mod layout {
    /// Length of a type discriminator
    pub const DISCRIMINATOR_LEN: usize = 8;

    /// authority (32) + price (8) + decimals (1) + bump (1)
    pub const PRICE_RECORD_LEN: usize = 32 + 8 + 1 + 1;

    /// Full account size, discriminator included
    pub const PRICE_RECORD_SPACE: usize = DISCRIMINATOR_LEN + PRICE_RECORD_LEN;

    /// `sha256("account:PriceData")[..8]`
    pub const PRICE_RECORD_DISCRIMINATOR: [u8; 8] = [232, 113, 193, 231, 133, 209, 206, 154];
}

/// Event and instruction tags
pub mod tags {
    /// `sha256("event:PriceInfo")[..8]`
    pub const PRICE_INFO_EVENT: [u8; 8] = [87, 168, 17, 64, 171, 165, 192, 243];

    /// `sha256("global:initialize")[..8]`
    pub const INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];

    /// `sha256("global:update_price")[..8]`
    pub const UPDATE_PRICE: [u8; 8] = [61, 34, 117, 155, 75, 34, 123, 208];

    /// `sha256("global:get_price")[..8]`
    pub const GET_PRICE: [u8; 8] = [238, 38, 193, 106, 228, 32, 210, 33];
}

/// Error numbering
pub mod errors {
    /// First number assigned to program errors
    pub const ERROR_CODE_OFFSET: u32 = 6000;
}

/// Event bus sizing
pub mod events {
    /// Events buffered per listener before the oldest are skipped
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

    /// Largest per-listener buffer a bus will allocate
    pub const MAX_CHANNEL_CAPACITY: usize = 1 << 16;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::discriminator;

    #[test]
    fn test_record_space() {
        assert_eq!(layout::PRICE_RECORD_LEN, 42);
        assert_eq!(layout::PRICE_RECORD_SPACE, 50);
    }

    #[test]
    fn test_tags_match_hashes() {
        assert_eq!(
            discriminator("account", "PriceData"),
            layout::PRICE_RECORD_DISCRIMINATOR
        );
        assert_eq!(discriminator("event", "PriceInfo"), tags::PRICE_INFO_EVENT);
        assert_eq!(discriminator("global", "initialize"), tags::INITIALIZE);
        assert_eq!(discriminator("global", "update_price"), tags::UPDATE_PRICE);
        assert_eq!(discriminator("global", "get_price"), tags::GET_PRICE);
    }
}
