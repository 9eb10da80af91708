//! Pluggable delivery mechanisms for relay envelopes.
//!
//! A [`Transport`] posts raw JSON envelopes and hands out [`Inbound`]
//! receivers. [`select_transport`] picks one at startup from configuration and
//! what the environment offers.

mod broadcast;
mod store_signal;

pub use broadcast::{BroadcastHub, BroadcastTransport};
pub use store_signal::StoreSignalTransport;

use std::sync::Arc;

use psra_config::{RelayConfig, TransportPreference};
use psra_store::{ChangeFeed, KeyValueStore};
use serde_json::Value;
use tokio::sync::broadcast as channel;

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Broadcast,
    StoreSignal,
}

impl TransportKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::StoreSignal => "store_signal",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Deliver `message` to every receiver on this transport.
    ///
    /// # Errors
    ///
    /// `RelayError::Closed` after [`Transport::close`], or a transport failure.
    fn post(&self, message: &Value) -> Result<(), RelayError>;

    /// A new receiver for messages posted after this call.
    fn subscribe(&self) -> Inbound;

    fn close(&self);

    fn is_healthy(&self) -> bool;
}

/// Receiving end of a transport.
#[derive(Debug)]
pub enum Inbound {
    Channel(channel::Receiver<Value>),
    Store { feed: ChangeFeed, key: String },
    /// Never yields anything.
    Idle,
}

impl Inbound {
    /// Next raw message. `None` once the source is exhausted; pending
    /// forever for [`Inbound::Idle`].
    pub async fn recv(&mut self) -> Option<Value> {
        match self {
            Self::Channel(rx) => loop {
                match rx.recv().await {
                    Ok(message) => return Some(message),
                    Err(channel::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification receiver lagged");
                    }
                    Err(channel::error::RecvError::Closed) => return None,
                }
            },
            Self::Store { feed, key } => loop {
                let change = feed.recv().await?;
                if let Some(message) = signal_message(key, change.key.as_str(), change.new_value) {
                    return Some(message);
                }
            },
            Self::Idle => std::future::pending().await,
        }
    }

    /// Next buffered raw message, without waiting.
    pub fn try_recv(&mut self) -> Option<Value> {
        match self {
            Self::Channel(rx) => loop {
                match rx.try_recv() {
                    Ok(message) => return Some(message),
                    Err(channel::error::TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification receiver lagged");
                    }
                    Err(_) => return None,
                }
            },
            Self::Store { feed, key } => loop {
                let change = feed.try_recv()?;
                if let Some(message) = signal_message(key, change.key.as_str(), change.new_value) {
                    return Some(message);
                }
            },
            Self::Idle => None,
        }
    }
}

/// Decode a store change on the signal key. Removals and foreign keys are
/// ignored; unparsable values are logged and skipped.
fn signal_message(signal_key: &str, key: &str, new_value: Option<String>) -> Option<Value> {
    if key != signal_key {
        return None;
    }
    let raw = new_value?;
    match serde_json::from_str(&raw) {
        Ok(message) => Some(message),
        Err(error) => {
            tracing::warn!(key, %error, "ignoring unparsable store signal");
            None
        }
    }
}

/// Pick the transport for a relay.
///
/// `hub` stands in for a host that supports named broadcast channels; `store`
/// is the shared key/value store used by the store-signal transport.
///
/// # Errors
///
/// `RelayError::Unavailable` when the configured (or any) transport cannot be
/// built from what is available.
pub fn select_transport(
    config: &RelayConfig,
    hub: Option<&BroadcastHub>,
    store: Option<Arc<dyn KeyValueStore>>,
) -> Result<Arc<dyn Transport>, RelayError> {
    let open_broadcast = |hub: &BroadcastHub| -> Arc<dyn Transport> {
        Arc::new(BroadcastTransport::open(hub, &config.channel_name))
    };
    let open_signal = |store: Arc<dyn KeyValueStore>| -> Arc<dyn Transport> {
        Arc::new(StoreSignalTransport::new(store, config))
    };

    let selected = match (config.transport, hub, store) {
        (TransportPreference::Broadcast | TransportPreference::Auto, Some(hub), _) => {
            open_broadcast(hub)
        }
        (TransportPreference::Broadcast, None, _) => {
            return Err(RelayError::Unavailable(
                "broadcast transport requested but no channel hub is available".into(),
            ));
        }
        (TransportPreference::StoreSignal | TransportPreference::Auto, _, Some(store)) => {
            open_signal(store)
        }
        (TransportPreference::StoreSignal | TransportPreference::Auto, _, None) => {
            return Err(RelayError::Unavailable(
                "store-signal transport needs a store".into(),
            ));
        }
    };

    tracing::debug!(
        preference = ?config.transport,
        transport = %selected.kind(),
        "selected notification transport"
    );
    Ok(selected)
}
