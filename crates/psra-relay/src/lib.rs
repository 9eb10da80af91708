//! # psra-relay
//!
//! Cross-session notifications for PSRA dispatch.
//!
//! A [`NotificationRelay`] sends typed [`Notification`]s wrapped in a JSON
//! envelope over a pluggable [`Transport`] and fans inbound ones out to
//! per-type listeners. Two transports exist: named broadcast channels on a
//! shared [`BroadcastHub`], and a signal key on a shared key/value store for
//! hosts without broadcast channels.
//!
//! Each relay carries a [`SenderId`]; its own messages are never delivered
//! back to it. Malformed inbound messages are logged and dropped.

pub mod error;
pub mod message;
pub mod relay;
pub mod transport;

pub use error::RelayError;
pub use message::{
    Envelope, IncidentsUpdated, Notification, NotificationType, SenderId, SupportApproved,
    SupportDeleted,
};
pub use relay::{NotificationRelay, Subscription};
pub use transport::{
    BroadcastHub, BroadcastTransport, Inbound, StoreSignalTransport, Transport, TransportKind,
    select_transport,
};
