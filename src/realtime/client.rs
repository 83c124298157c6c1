use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::RealtimeConfig;
use crate::session::SessionCache;

use super::backoff::{BackoffConfig, ExponentialBackoff};
use super::message::{events, ClientMessage, InboundMessage};
use super::registry::{ListenerRegistry, Subscription};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of the shared connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Open,
    /// Waiting out a backoff delay before the given attempt
    Reconnecting { attempt: u32 },
}

struct ConnectionState {
    status: ConnectionStatus,
    attempts: u32,
    /// Bumped on every connect/disconnect so a stale task can't overwrite state
    generation: u64,
    shutdown: Option<broadcast::Sender<()>>,
}

struct Inner {
    url: String,
    channels: Vec<String>,
    backoff: BackoffConfig,
    sessions: SessionCache,
    registry: Arc<ListenerRegistry>,
    state: Mutex<ConnectionState>,
}

/// Shared realtime channel to the backend.
///
/// Cloning yields another handle to the same connection and listeners. No
/// public operation returns an error: transport failures and malformed
/// payloads are logged at `debug` and swallowed, so callers that need fresh
/// data keep their own polling alongside.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

enum SessionEnd {
    /// Socket closed or failed; eligible for reconnect
    Closed,
    /// `disconnect()` was called
    Shutdown,
}

impl RealtimeClient {
    /// Create a disconnected client; nothing happens until [`connect`](Self::connect)
    pub fn new(url: impl Into<String>, config: &RealtimeConfig, sessions: SessionCache) -> Self {
        let backoff = BackoffConfig {
            base_delay_ms: config.base_delay_ms,
            max_attempts: config.max_reconnect_attempts,
            jitter_factor: 0.0,
        };

        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                channels: config.channels.clone(),
                backoff,
                sessions,
                registry: ListenerRegistry::new(),
                state: Mutex::new(ConnectionState {
                    status: ConnectionStatus::Disconnected,
                    attempts: 0,
                    generation: 0,
                    shutdown: None,
                }),
            }),
        }
    }

    /// Open the shared connection.
    ///
    /// No-op while a connection is open, being established or waiting to
    /// reconnect. Skipped silently when no WebSocket token is stored or when
    /// called outside a tokio runtime.
    pub fn connect(&self) {
        let mut state = self.inner.state.lock();
        if state.status != ConnectionStatus::Disconnected {
            return;
        }

        let token = match self.inner.sessions.ws_token() {
            Some(token) => token,
            None => {
                tracing::debug!("No WebSocket token stored, skipping realtime connection");
                return;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!("No tokio runtime available, skipping realtime connection");
                return;
            }
        };

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        state.generation += 1;
        state.attempts = 0;
        state.status = ConnectionStatus::Connecting;
        state.shutdown = Some(shutdown_tx);

        let inner = self.inner.clone();
        let generation = state.generation;
        runtime.spawn(async move {
            inner.run(token, generation, shutdown_rx).await;
        });
    }

    /// Cancel any pending reconnect, close the socket and reset the counter
    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        state.attempts = 0;
        state.status = ConnectionStatus::Disconnected;

        // The task sends the close frame itself once it sees the signal.
        if let Some(shutdown) = state.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    /// Register `callback` for messages of `event_type`
    pub fn subscribe_to_event<F>(&self, event_type: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.registry.subscribe(event_type, callback)
    }

    /// Listener registry shared by every clone of this client
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.inner.registry
    }

    /// Current connection lifecycle state
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.lock().status
    }

    /// True while the socket is open
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Open
    }

    /// Reconnects scheduled since the last successful open
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().attempts
    }

    /// Parse and dispatch one inbound text frame; returns the listeners reached
    pub fn handle_text(&self, text: &str) -> usize {
        self.inner.handle_text(text)
    }
}

/// Resets the state to `Disconnected` when the supervisor task ends, however it ends
struct RunGuard {
    inner: Arc<Inner>,
    generation: u64,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.inner
            .set_status(self.generation, ConnectionStatus::Disconnected);
    }
}

impl Inner {
    async fn run(
        self: Arc<Self>,
        mut token: String,
        generation: u64,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let _guard = RunGuard {
            inner: self.clone(),
            generation,
        };
        let mut backoff = ExponentialBackoff::with_config(self.backoff.clone());

        loop {
            if !self.set_status(generation, ConnectionStatus::Connecting) {
                return;
            }

            let connected = tokio::select! {
                _ = shutdown.recv() => return,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((ws, _)) => {
                    backoff.reset();
                    if !self.mark_open(generation) {
                        return;
                    }
                    tracing::info!(url = %self.url, "Realtime connection open");

                    let end = self.run_session(ws, &token, &mut shutdown).await;
                    self.registry.dispatch(events::WS_CLOSE, &Value::Null);
                    if let SessionEnd::Shutdown = end {
                        tracing::info!("Realtime connection closed by client");
                        return;
                    }
                    tracing::debug!("Realtime connection closed");
                }
                Err(e) => {
                    tracing::debug!(url = %self.url, error = %e, "Realtime connection failed");
                }
            }

            let delay = match backoff.next_delay() {
                Some(delay) => delay,
                None => {
                    tracing::warn!(
                        attempts = backoff.attempt(),
                        "Realtime reconnect attempts exhausted"
                    );
                    return;
                }
            };

            let attempt = backoff.attempt();
            if !self.mark_reconnecting(generation, attempt) {
                return;
            }
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling realtime reconnect");

            tokio::select! {
                _ = shutdown.recv() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            // A logout while waiting removes the token; stop instead of retrying.
            token = match self.sessions.ws_token() {
                Some(token) => token,
                None => {
                    tracing::debug!("WebSocket token gone, abandoning reconnect");
                    return;
                }
            };
        }
    }

    async fn run_session(
        &self,
        ws: WsStream,
        token: &str,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        let handshake = [
            ClientMessage::authenticate(token),
            ClientMessage::subscribe(self.channels.clone()),
        ];
        for message in &handshake {
            let text = match message.to_json() {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to serialize handshake message");
                    return SessionEnd::Closed;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                tracing::debug!(error = %e, "Failed to send handshake message");
                return SessionEnd::Closed;
            }
        }

        self.registry.dispatch(events::WS_OPEN, &Value::Null);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.handle_text(text.as_str());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "Server closed realtime connection");
                        return SessionEnd::Closed;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Realtime socket error");
                        return SessionEnd::Closed;
                    }
                    None => return SessionEnd::Closed,
                }
            }
        }
    }

    fn handle_text(&self, text: &str) -> usize {
        match InboundMessage::parse(text) {
            Ok(message) => self.registry.dispatch(&message.event_type, &message.data),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed realtime message");
                0
            }
        }
    }

    fn set_status(&self, generation: u64, status: ConnectionStatus) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.status = status;
        if status == ConnectionStatus::Disconnected {
            state.shutdown = None;
        }
        true
    }

    fn mark_open(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.attempts = 0;
        state.status = ConnectionStatus::Open;
        true
    }

    fn mark_reconnecting(&self, generation: u64, attempt: u32) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.attempts = attempt;
        state.status = ConnectionStatus::Reconnecting { attempt };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, WS_TOKEN_KEY};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client_with_store(store: Arc<MemoryStore>) -> RealtimeClient {
        RealtimeClient::new(
            "ws://127.0.0.1:1/ws",
            &RealtimeConfig::default(),
            SessionCache::new(store),
        )
    }

    #[test]
    fn test_connect_without_token_is_skipped() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        client.connect();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_connect_outside_runtime_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.set(WS_TOKEN_KEY, "tok").unwrap();
        let client = client_with_store(store);
        client.connect();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_malformed_messages_are_discarded() {
        let client = client_with_store(Arc::new(MemoryStore::new()));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let sub = client.subscribe_to_event("reserve_update", move |data| {
            assert_eq!(data["currency"], "USD");
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(client.handle_text("{oops"), 0);
        assert_eq!(client.handle_text(r#"{"no_type": true}"#), 0);
        let ok = json!({"type": "reserve_update", "data": {"currency": "USD"}}).to_string();
        assert_eq!(client.handle_text(&ok), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        sub.unsubscribe();
    }

    #[tokio::test]
    async fn test_disconnect_resets_state() {
        let store = Arc::new(MemoryStore::new());
        store.set(WS_TOKEN_KEY, "tok").unwrap();
        let client = client_with_store(store);

        client.connect();
        assert_ne!(client.status(), ConnectionStatus::Disconnected);

        client.disconnect();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert_eq!(client.reconnect_attempts(), 0);

        // Idempotent
        client.disconnect();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }
}
