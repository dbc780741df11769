//! Oracle Events
//!
//! Events are emitted during instruction execution and fanned out to
//! off-chain listeners. They are never persisted.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{layout::DISCRIMINATOR_LEN, tags};
use crate::types::{Address, PriceRecord};

/// Event types for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    PriceInfo = 0x60,
}

/// Snapshot of a price record published by `get_price`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceInfo {
    pub price: u64,
    pub decimals: u8,
    pub authority: Address,
}

impl From<&PriceRecord> for PriceInfo {
    fn from(record: &PriceRecord) -> Self {
        Self {
            price: record.price,
            decimals: record.decimals,
            authority: record.authority,
        }
    }
}

/// Main event enum containing all oracle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// Current record contents, emitted on read
    PriceInfo(PriceInfo),
}

impl OracleEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PriceInfo(_) => EventType::PriceInfo,
        }
    }

    /// Event name as listeners register for it
    pub fn name(&self) -> &'static str {
        match self {
            Self::PriceInfo(_) => "PriceInfo",
        }
    }

    /// Serialize as `discriminator | borsh(body)`
    pub fn to_bytes(&self) -> Vec<u8> {
        let (tag, body) = match self {
            Self::PriceInfo(info) => (tags::PRICE_INFO_EVENT, borsh::to_vec(info).unwrap_or_default()),
        };
        let mut bytes = Vec::with_capacity(DISCRIMINATOR_LEN + body.len());
        bytes.extend_from_slice(&tag);
        bytes.extend_from_slice(&body);
        bytes
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < DISCRIMINATOR_LEN {
            return None;
        }
        let (tag, body) = bytes.split_at(DISCRIMINATOR_LEN);
        if tag == tags::PRICE_INFO_EVENT {
            borsh::from_slice(body).ok().map(Self::PriceInfo)
        } else {
            None
        }
    }
}

/// Events collected during a single instruction
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<OracleEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: OracleEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[OracleEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<OracleEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&OracleEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
