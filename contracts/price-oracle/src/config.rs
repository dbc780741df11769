//! Oracle Configuration
//!
//! Runtime settings for an oracle program instance. The defaults match the
//! reference deployment.

use oracle_common::constants::{
    events::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY},
    program::PROGRAM_ID,
};
use oracle_common::Address;
use serde::{Deserialize, Serialize};

/// Program instance settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Program identity mixed into every derived address
    pub program_id: Address,
    /// Events buffered per listener; the bus clamps it to
    /// `1..=MAX_CHANNEL_CAPACITY`
    pub event_capacity: usize,
}

impl OracleConfig {
    /// Config for a program deployed under `program_id`
    pub fn new(program_id: Address) -> Self {
        Self {
            program_id,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Override the per-listener buffer (between 1 and `MAX_CHANNEL_CAPACITY`)
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.clamp(1, MAX_CHANNEL_CAPACITY);
        self
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self::new(PROGRAM_ID)
    }
}
