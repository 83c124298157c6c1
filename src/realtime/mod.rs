//! Realtime sync client
//!
//! One shared WebSocket to the backend: authenticated in-band, subscribed to
//! the configured channels, fanning inbound `{type, data}` messages out to
//! listeners by type, reconnecting with exponential backoff.

mod backoff;
mod client;
mod message;
mod registry;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use client::{ConnectionStatus, RealtimeClient};
pub use message::{events, ClientMessage, InboundMessage};
pub use registry::{EventCallback, ListenerRegistry, Subscription};
