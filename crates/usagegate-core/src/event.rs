//! Event bus for usagegate using tokio::broadcast
//!
//! Lets UI layers subscribe to quota events (denials, tracked usage, tier
//! changes) instead of polling the store.

use crate::sink::{AnalyticsSink, Properties};
use tokio::sync::broadcast;

/// A quota event as delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaEvent {
    pub name: String,
    pub properties: Properties,
}

/// Event bus for broadcasting quota events
///
/// Uses tokio::broadcast for multi-consumer support. Slow subscribers lag
/// and lose the oldest events rather than blocking the gate.
pub struct EventBus {
    sender: broadcast::Sender<QuotaEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: QuotaEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<QuotaEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl AnalyticsSink for EventBus {
    fn record(&self, event: &str, properties: &Properties) -> anyhow::Result<()> {
        self.publish(QuotaEvent {
            name: event.to_string(),
            properties: properties.clone(),
        });
        Ok(())
    }
}
