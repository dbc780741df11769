//! Event Bus
//!
//! Fans published events out to every listener registered at the time of
//! publishing. Events are not retained: a listener that subscribes later
//! never sees them, and publishing with no listeners is not an error.
//!
//! Uses `tokio::sync::broadcast`, so publishing never waits on listeners.
//! A listener that falls more than `capacity` events behind skips the
//! oldest ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use oracle_common::constants::events::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY};
use oracle_common::{EventType, OracleEvent};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from listener operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Every bus handle was dropped
    #[error("Event bus closed")]
    Closed,
}

/// Broadcast hub for oracle events
///
/// Cloning yields another handle to the same channel, so listeners can be
/// registered from outside the program that publishes.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OracleEvent>,
    published: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a bus with the default per-listener buffer
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus buffering up to `capacity` events per listener,
    /// clamped to `1..=MAX_CHANNEL_CAPACITY`
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a listener for all events
    pub fn subscribe(&self) -> EventListener {
        debug!(listeners = self.listener_count() + 1, "Listener registered");
        EventListener {
            receiver: self.sender.subscribe(),
            filter: None,
        }
    }

    /// Register a listener for one event type
    pub fn subscribe_to(&self, event_type: EventType) -> EventListener {
        EventListener {
            filter: Some(event_type),
            ..self.subscribe()
        }
    }

    /// Deliver `event` to current listeners; returns how many were reached
    pub fn publish(&self, event: OracleEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(event) {
            Ok(reached) => reached,
            Err(_) => {
                debug!("Event published with no listeners");
                0
            }
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published through any handle
    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered listener; dropping it deregisters
#[derive(Debug)]
pub struct EventListener {
    receiver: broadcast::Receiver<OracleEvent>,
    filter: Option<EventType>,
}

impl EventListener {
    fn matches(&self, event: &OracleEvent) -> bool {
        self.filter.map_or(true, |t| event.event_type() == t)
    }

    /// Next matching event without waiting
    ///
    /// - `Ok(Some(event))` - an event was available
    /// - `Ok(None)` - nothing pending
    /// - `Err(ListenerError::Closed)` - the bus is gone
    pub fn try_recv(&mut self) -> Result<Option<OracleEvent>, ListenerError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(ListenerError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    debug!(lagged = count, "Listener lagged, some events dropped");
                    continue;
                }
            };

            if self.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Wait for the next matching event; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<OracleEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Listener lagged, some events dropped");
                    continue;
                }
            };

            if self.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Collect everything currently pending
    pub fn drain(&mut self) -> Vec<OracleEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_common::{Address, PriceInfo};

    fn price_info(price: u64) -> OracleEvent {
        OracleEvent::PriceInfo(PriceInfo {
            price,
            decimals: 2,
            authority: Address::new([4u8; 32]),
        })
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new();

        assert_eq!(bus.publish(price_info(1)), 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[test]
    fn test_fan_out() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe_to(EventType::PriceInfo);

        assert_eq!(bus.publish(price_info(7)), 2);

        assert_eq!(a.try_recv(), Ok(Some(price_info(7))));
        assert_eq!(b.try_recv(), Ok(Some(price_info(7))));
        assert_eq!(a.try_recv(), Ok(None));
    }

    #[test]
    fn test_late_listener_sees_nothing() {
        let bus = EventBus::new();
        bus.publish(price_info(1));

        let mut late = bus.subscribe();

        assert_eq!(late.try_recv(), Ok(None));
    }

    #[test]
    fn test_drop_deregisters() {
        let bus = EventBus::new();
        let listener = bus.subscribe();
        assert_eq!(bus.listener_count(), 1);

        drop(listener);

        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.publish(price_info(1)), 0);
    }

    #[test]
    fn test_cloned_handle_shares_channel() {
        let bus = EventBus::new();
        let external = bus.clone();
        let mut listener = external.subscribe();

        bus.publish(price_info(3));

        assert_eq!(listener.drain(), vec![price_info(3)]);
        assert_eq!(external.events_published(), 1);
    }

    #[test]
    fn test_lagging_listener_skips_oldest() {
        let bus = EventBus::with_capacity(2);
        let mut listener = bus.subscribe();

        for price in 1..=4 {
            bus.publish(price_info(price));
        }

        assert_eq!(listener.drain(), vec![price_info(3), price_info(4)]);
    }

    #[test]
    fn test_closed_bus() {
        let bus = EventBus::new();
        let mut listener = bus.subscribe();
        drop(bus);

        assert_eq!(listener.try_recv(), Err(ListenerError::Closed));
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        let bus = EventBus::with_capacity(usize::MAX);
        let mut listener = bus.subscribe();

        assert_eq!(bus.publish(price_info(5)), 1);
        assert_eq!(listener.drain(), vec![price_info(5)]);
    }

    #[test]
    fn test_zero_capacity_still_delivers() {
        let bus = EventBus::with_capacity(0);
        let mut listener = bus.subscribe();

        bus.publish(price_info(6));

        assert_eq!(listener.try_recv(), Ok(Some(price_info(6))));
    }

    #[tokio::test]
    async fn test_async_recv() {
        let bus = EventBus::new();
        let mut listener = bus.subscribe();

        bus.publish(price_info(9));

        assert_eq!(listener.recv().await, Some(price_info(9)));
    }
}
