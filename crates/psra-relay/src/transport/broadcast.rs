//! Named in-process broadcast channels.
//!
//! A [`BroadcastHub`] plays the role of the host's channel registry: every
//! session that opens the same channel name on the same hub receives every
//! message posted to it, including its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;

use super::{Inbound, Transport, TransportKind};
use crate::error::RelayError;

#[derive(Debug, Clone)]
pub struct BroadcastHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Value>>>>,
    capacity: usize,
}

impl BroadcastHub {
    /// `capacity` is the per-receiver backlog before a slow receiver lags.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    fn channel(&self, name: &str) -> broadcast::Sender<Value> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[derive(Debug)]
pub struct BroadcastTransport {
    name: String,
    sender: broadcast::Sender<Value>,
    closed: AtomicBool,
}

impl BroadcastTransport {
    #[must_use]
    pub fn open(hub: &BroadcastHub, name: &str) -> Self {
        Self {
            name: name.to_string(),
            sender: hub.channel(name),
            closed: AtomicBool::new(false),
        }
    }
}

impl Transport for BroadcastTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Broadcast
    }

    fn post(&self, message: &Value) -> Result<(), RelayError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RelayError::Closed);
        }
        // Err only means nobody is listening right now.
        let receivers = self.sender.send(message.clone()).unwrap_or(0);
        tracing::trace!(channel = %self.name, receivers, "posted to broadcast channel");
        Ok(())
    }

    fn subscribe(&self) -> Inbound {
        Inbound::Channel(self.sender.subscribe())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_healthy(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_name_shares_a_channel() {
        let hub = BroadcastHub::new(4);
        let first = BroadcastTransport::open(&hub, "psra-notifications");
        let second = BroadcastTransport::open(&hub, "psra-notifications");
        let other = BroadcastTransport::open(&hub, "elsewhere");
        let mut inbound = second.subscribe();
        let mut unrelated = other.subscribe();

        first.post(&json!({"n": 1})).unwrap();
        assert_eq!(inbound.try_recv(), Some(json!({"n": 1})));
        assert_eq!(unrelated.try_recv(), None);
    }

    #[test]
    fn closed_transport_refuses_posts() {
        let hub = BroadcastHub::new(4);
        let transport = BroadcastTransport::open(&hub, "psra-notifications");
        transport.close();
        assert!(!transport.is_healthy());
        assert!(matches!(transport.post(&json!({})), Err(RelayError::Closed)));
    }
}
