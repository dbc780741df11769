//! Program Derived Addresses
//!
//! A record's address is never chosen by a caller. It is the SHA-256 of the
//! seeds, a bump byte, the program id and a fixed marker, constrained to
//! land *off* the ed25519 curve so no private key can ever sign for it.
//!
//! ```text
//! sha256(seed_0 | ... | seed_n | [bump] | program_id | "ProgramDerivedAddress")
//! ```
//!
//! `find_program_address` searches bumps from 255 downward and returns the
//! first off-curve result. The bump is stored with the record so later
//! instructions can re-validate with a single `create_program_address`.

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::constants::derivation::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
use crate::errors::{OracleError, OracleResult};
use crate::types::Address;

/// Source of derived addresses, injectable for testing
pub trait AddressDeriver {
    /// Derive the address for `seeds` (bump already included)
    fn create_program_address(&self, seeds: &[&[u8]], program_id: &Address) -> OracleResult<Address>;

    /// Search for the canonical bump and its address
    fn find_program_address(&self, seeds: &[&[u8]], program_id: &Address) -> OracleResult<(Address, u8)> {
        let bumps: Vec<[u8; 1]> = (1..=u8::MAX).rev().map(|bump| [bump]).collect();
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&[]);

        for bump_seed in &bumps {
            if let Some(slot) = with_bump.last_mut() {
                *slot = bump_seed;
            }

            match self.create_program_address(&with_bump, program_id) {
                Ok(address) => return Ok((address, bump_seed[0])),
                Err(OracleError::InvalidSeeds) => {}
                Err(err) => return Err(err),
            }
        }
        Err(OracleError::NoViableBump)
    }
}

/// SHA-256 derivation compatible with the reference client helper
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramDerivation;

impl AddressDeriver for ProgramDerivation {
    fn create_program_address(&self, seeds: &[&[u8]], program_id: &Address) -> OracleResult<Address> {
        create_program_address(seeds, program_id)
    }
}

/// Derive an address from seeds that already include the bump
pub fn create_program_address(seeds: &[&[u8]], program_id: &Address) -> OracleResult<Address> {
    if seeds.len() > MAX_SEEDS {
        return Err(OracleError::MaxSeedLengthExceeded);
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(OracleError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return Err(OracleError::InvalidSeeds);
    }
    Ok(Address::new(hash))
}

/// Find the canonical (highest viable) bump for `seeds`
pub fn find_program_address(seeds: &[&[u8]], program_id: &Address) -> OracleResult<(Address, u8)> {
    ProgramDerivation.find_program_address(seeds, program_id)
}

/// True if the bytes decompress to an ed25519 point
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{program::PROGRAM_ID, seeds::PRICE_FEED_SEED};

    fn from_hex(s: &str) -> Address {
        let bytes: [u8; 32] = hex::decode(s).unwrap().try_into().unwrap();
        Address::new(bytes)
    }

    /// `BPFLoaderUpgradeab1e11111111111111111111111`
    fn upgradeable_loader() -> Address {
        from_hex("02a8f6914e88a1b0e210153ef763ae2b00c2b93d16c124d2c0537a1004800000")
    }

    #[test]
    fn test_reference_vectors() {
        // 2fnQrngrQT4SeLcdToJAD96phoEjNL2man2kfRLCASVk
        let address = create_program_address(&[b"Talking", b"Squirrels"], &upgradeable_loader()).unwrap();
        assert_eq!(
            address,
            from_hex("18cb1abd4405baf9119d11e46977c210063d6a8dfac767ef671cf7e860968aff")
        );
    }

    #[test]
    fn test_price_feed_address() {
        let (address, bump) = find_program_address(&[PRICE_FEED_SEED], &PROGRAM_ID).unwrap();

        assert_eq!(bump, 255);
        assert_eq!(
            address,
            from_hex("917df1aa16ba12257783faec18946fb3edada1361bb6ccf20ba06a486f0a89ca")
        );
        assert_eq!(
            create_program_address(&[PRICE_FEED_SEED, &[bump]], &PROGRAM_ID).unwrap(),
            address
        );
    }

    #[test]
    fn test_skips_on_curve_bumps() {
        let (address, bump) = find_program_address(&[b"price_feed_v3"], &PROGRAM_ID).unwrap();

        assert_eq!(bump, 253);
        assert_eq!(
            address,
            from_hex("55c4231a88b21950da2c885838a3e743d8643d5360b2e1e29b8ba1711674224d")
        );
        assert_eq!(
            create_program_address(&[b"price_feed_v3", &[254]], &PROGRAM_ID),
            Err(OracleError::InvalidSeeds)
        );
    }

    #[test]
    fn test_seed_limits() {
        let long = [0u8; MAX_SEED_LEN + 1];
        assert_eq!(
            create_program_address(&[&long], &PROGRAM_ID),
            Err(OracleError::MaxSeedLengthExceeded)
        );

        let many: Vec<&[u8]> = vec![&b"x"[..]; MAX_SEEDS + 1];
        assert_eq!(
            create_program_address(&many, &PROGRAM_ID),
            Err(OracleError::MaxSeedLengthExceeded)
        );

        // The bump counts toward the seed limit
        let sixteen: Vec<&[u8]> = vec![&b"x"[..]; MAX_SEEDS];
        assert_eq!(
            find_program_address(&sixteen, &PROGRAM_ID),
            Err(OracleError::MaxSeedLengthExceeded)
        );
    }

    #[test]
    fn test_curve_check() {
        // Compressed ed25519 base point
        let mut base = [0x66u8; 32];
        base[0] = 0x58;
        assert!(is_on_curve(&base));

        let (address, _) = find_program_address(&[PRICE_FEED_SEED], &PROGRAM_ID).unwrap();
        assert!(!is_on_curve(address.as_bytes()));
    }

    struct NeverOffCurve;

    impl AddressDeriver for NeverOffCurve {
        fn create_program_address(&self, _: &[&[u8]], _: &Address) -> OracleResult<Address> {
            Err(OracleError::InvalidSeeds)
        }
    }

    #[test]
    fn test_no_viable_bump() {
        assert_eq!(
            NeverOffCurve.find_program_address(&[PRICE_FEED_SEED], &PROGRAM_ID),
            Err(OracleError::NoViableBump)
        );
    }

    /// Records the bump byte and seed count of every attempt
    struct RecordingDeriver(std::cell::RefCell<Vec<(u8, usize)>>);

    impl AddressDeriver for RecordingDeriver {
        fn create_program_address(&self, seeds: &[&[u8]], _program_id: &Address) -> OracleResult<Address> {
            let bump = seeds.last().and_then(|s| s.first()).copied().unwrap_or_default();
            self.0.borrow_mut().push((bump, seeds.len()));
            Err(OracleError::InvalidSeeds)
        }
    }

    #[test]
    fn test_bump_search_order() {
        let deriver = RecordingDeriver(std::cell::RefCell::new(Vec::new()));

        let _ = deriver.find_program_address(&[&b"a"[..], &b"b"[..]], &PROGRAM_ID);

        let attempts = deriver.0.into_inner();
        assert_eq!(attempts.len(), 255);
        assert_eq!(attempts.first(), Some(&(255, 3)));
        assert_eq!(attempts.last(), Some(&(1, 3)));
        assert!(attempts.windows(2).all(|w| w[0].0 == w[1].0 + 1));
    }
}
