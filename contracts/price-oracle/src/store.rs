//! Price Record Store
//!
//! Owns every persisted record as raw account bytes keyed by derived
//! address. Records are decoded on each read, so what callers see is
//! exactly what is stored.

use std::collections::BTreeMap;

use oracle_common::{Address, OracleError, OracleResult, PriceRecord};
use tracing::debug;

/// In-memory account storage for price records
#[derive(Debug, Clone, Default)]
pub struct PriceRecordStore {
    accounts: BTreeMap<Address, Vec<u8>>,
}

impl PriceRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any account exists at `address`
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Decode the record at `address`
    pub fn fetch(&self, address: &Address) -> OracleResult<PriceRecord> {
        let data = self
            .accounts
            .get(address)
            .ok_or(OracleError::RecordNotFound { address: *address })?;
        PriceRecord::try_from_account_data(data)
    }

    /// Raw persisted bytes at `address`
    pub fn account_data(&self, address: &Address) -> Option<&[u8]> {
        self.accounts.get(address).map(Vec::as_slice)
    }

    /// Allocate and write a new record
    pub fn create(&mut self, address: Address, record: &PriceRecord) -> OracleResult<()> {
        if self.contains(&address) {
            return Err(OracleError::AlreadyInitialized { address });
        }
        debug!(%address, space = PriceRecord::SPACE, "Allocating price record");
        self.accounts.insert(address, record.to_account_data());
        Ok(())
    }

    /// Overwrite an existing record in one step
    pub fn commit(&mut self, address: Address, record: &PriceRecord) -> OracleResult<()> {
        let slot = self
            .accounts
            .get_mut(&address)
            .ok_or(OracleError::RecordNotFound { address })?;
        *slot = record.to_account_data();
        Ok(())
    }

    /// Addresses of all stored records
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.accounts.keys()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if nothing has been created
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
