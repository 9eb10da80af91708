//! The notification relay: one per session.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use psra_config::RelayConfig;
use psra_store::KeyValueStore;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::RelayError;
use crate::message::{Envelope, Notification, NotificationType, SenderId};
use crate::transport::{
    BroadcastHub, Inbound, StoreSignalTransport, Transport, TransportKind, select_transport,
};

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_type: HashMap<NotificationType, Vec<(u64, Callback)>>,
}

/// Handle returned by [`NotificationRelay::listen`].
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    listeners: Weak<Mutex<Listeners>>,
    kind: NotificationType,
    id: u64,
}

impl Subscription {
    #[must_use]
    pub const fn kind(&self) -> NotificationType {
        self.kind
    }

    /// Remove this listener only.
    pub fn unsubscribe(self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = listeners.by_type.get_mut(&self.kind) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                listeners.by_type.remove(&self.kind);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

/// Receivers for the primary transport and, optionally, the store fallback.
struct Sources {
    primary: Inbound,
    fallback: Inbound,
}

/// Sends typed notifications to other sessions and dispatches the ones it
/// receives to registered listeners.
///
/// Messages stamped with this relay's own [`SenderId`] are never delivered
/// back to it. Delivery is at most once and unordered across types.
pub struct NotificationRelay {
    sender_id: SenderId,
    transport: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
    sources: Mutex<Option<Sources>>,
    listeners: Arc<Mutex<Listeners>>,
    closed: watch::Sender<bool>,
}

impl std::fmt::Debug for NotificationRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRelay")
            .field("sender_id", &self.sender_id)
            .field("transport", &self.transport.kind())
            .field("fallback", &self.fallback.as_ref().map(|t| t.kind()))
            .finish_non_exhaustive()
    }
}

impl NotificationRelay {
    /// A relay over `transport`, identified by `sender_id`.
    #[must_use]
    pub fn new(sender_id: SenderId, transport: Arc<dyn Transport>) -> Self {
        let primary = transport.subscribe();
        Self {
            sender_id,
            transport,
            fallback: None,
            sources: Mutex::new(Some(Sources {
                primary,
                fallback: Inbound::Idle,
            })),
            listeners: Arc::default(),
            closed: watch::channel(false).0,
        }
    }

    /// Also post (and listen) through `fallback` when the primary transport
    /// fails to post.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn Transport>) -> Self {
        let inbound = fallback.subscribe();
        if let Some(sources) = self
            .sources
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            sources.fallback = inbound;
        }
        self.fallback = Some(fallback);
        self
    }

    /// Select a transport from configuration and build the relay. When the
    /// primary is a broadcast channel and a store is available, the store
    /// signal becomes the fallback.
    ///
    /// # Errors
    ///
    /// `RelayError::Unavailable` if no transport can be built.
    pub fn connect(
        config: &RelayConfig,
        sender_id: SenderId,
        hub: Option<&BroadcastHub>,
        store: Option<Arc<dyn KeyValueStore>>,
    ) -> Result<Self, RelayError> {
        let transport = select_transport(config, hub, store.clone())?;
        let mut relay = Self::new(sender_id, transport);
        if relay.transport.kind() == TransportKind::Broadcast {
            if let Some(store) = store {
                relay = relay.with_fallback(Arc::new(StoreSignalTransport::new(store, config)));
            }
        }
        tracing::debug!(
            sender_id = %relay.sender_id,
            transport = %relay.transport.kind(),
            "notification relay connected"
        );
        Ok(relay)
    }

    #[must_use]
    pub const fn sender_id(&self) -> &SenderId {
        &self.sender_id
    }

    #[must_use]
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        !*self.closed.borrow() && self.transport.is_healthy()
    }

    /// Send `notification` to every other session.
    ///
    /// # Errors
    ///
    /// `RelayError::Closed` after [`Self::close`]; otherwise the transport
    /// error when both the primary and the fallback fail.
    pub fn send(&self, notification: &Notification) -> Result<(), RelayError> {
        if *self.closed.borrow() {
            return Err(RelayError::Closed);
        }
        let envelope = Envelope::new(notification.clone(), self.sender_id.clone());
        let wire = envelope.to_wire()?;

        match self.transport.post(&wire) {
            Ok(()) => {}
            Err(primary) => {
                let Some(fallback) = &self.fallback else {
                    return Err(primary);
                };
                tracing::warn!(
                    notification_type = %notification.kind(),
                    error = %primary,
                    "primary transport failed, retrying via {}",
                    fallback.kind()
                );
                fallback.post(&wire)?;
            }
        }

        tracing::debug!(
            notification_type = %notification.kind(),
            sender_id = %self.sender_id,
            "notification sent"
        );
        Ok(())
    }

    /// Register `callback` for notifications of `kind`.
    pub fn listen<F>(&self, kind: NotificationType, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners
            .by_type
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            kind,
            id,
        }
    }

    #[must_use]
    pub fn listener_count(&self, kind: NotificationType) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_type
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Types with at least one listener, in declaration order.
    #[must_use]
    pub fn active_types(&self) -> Vec<NotificationType> {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let mut kinds: Vec<NotificationType> = listeners
            .by_type
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Drop all listeners and close the transports. Idempotent.
    pub fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_type
            .clear();
        self.transport.close();
        if let Some(fallback) = &self.fallback {
            fallback.close();
        }
        tracing::debug!(sender_id = %self.sender_id, "notification relay closed");
    }

    /// Deliver everything already received. Returns the number of
    /// notifications handed to listeners. A no-op while [`Self::run`] owns
    /// the receivers.
    pub fn drain(&self) -> usize {
        let mut guard = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sources) = guard.as_mut() else {
            return 0;
        };
        let mut delivered = 0;
        for inbound in [&mut sources.primary, &mut sources.fallback] {
            while let Some(raw) = inbound.try_recv() {
                if *self.closed.borrow() {
                    return delivered;
                }
                if self.dispatch(&raw) {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Receive and deliver until [`Self::close`] is called or every source
    /// is exhausted. Meant for a background task.
    pub async fn run(&self) {
        let taken = self
            .sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut sources) = taken else {
            tracing::warn!(sender_id = %self.sender_id, "relay receive loop already running");
            return;
        };
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return;
        }

        let mut open = [true, true];
        loop {
            let (slot, message) = tokio::select! {
                message = sources.primary.recv(), if open[0] => (0, message),
                message = sources.fallback.recv(), if open[1] => (1, message),
                _ = closed.changed() => break,
            };
            match message {
                Some(raw) => {
                    self.dispatch(&raw);
                }
                None => {
                    open[slot] = false;
                    if !open.contains(&true) {
                        break;
                    }
                }
            }
        }
    }

    /// Validate, filter self-echo, and fan out to listeners. Returns whether
    /// any listener was invoked.
    fn dispatch(&self, raw: &Value) -> bool {
        let envelope = match Envelope::from_wire(raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(%error, "dropping invalid notification");
                return false;
            }
        };
        if envelope.sender_id == self.sender_id {
            return false;
        }

        let kind = envelope.notification.kind();
        let callbacks: Vec<Callback> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_type
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();
        if callbacks.is_empty() {
            return false;
        }

        tracing::debug!(
            notification_type = %kind,
            sender_id = %envelope.sender_id,
            listeners = callbacks.len(),
            "delivering notification"
        );
        for callback in &callbacks {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(&envelope.notification)));
            if outcome.is_err() {
                tracing::error!(notification_type = %kind, "notification listener panicked");
            }
        }
        true
    }
}

impl Drop for NotificationRelay {
    fn drop(&mut self) {
        self.close();
    }
}
