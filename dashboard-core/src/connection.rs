//! Persistent socket lifecycle and the fixed-delay reconnection policy.
//!
//! `Disconnected --connect()--> Connecting --open--> Connected --close-->
//! Disconnected (+ schedule reconnect)`. There is no terminal state.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a socket runtime (or the reconnect timer) reports back
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed { code: Option<u16>, reason: String },
    Error(Option<String>),
    ReconnectDue,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to create websocket for {url}: {reason}")]
    Create { url: String, reason: String },
}

/// Socket factory. `open` replaces any previous socket; completion and
/// failure are reported later as [`TransportEvent`]s.
pub trait Transport {
    fn open(&mut self, url: &str) -> Result<(), TransportError>;
}

/// One-shot timer that delivers [`TransportEvent::ReconnectDue`] after
/// `delay`. Scheduled timers are never cancelled.
pub trait ReconnectTimer {
    fn schedule(&mut self, delay: Duration);
}

/// Result of feeding one event into the manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutcome {
    Transitioned(ConnectionState),
    /// The socket could not be created; a reconnect is already scheduled.
    ConnectFailed(TransportError),
    Frame(String),
    Diagnostic(String),
    Unchanged,
}

pub struct ConnectionManager<T, R> {
    url: String,
    state: ConnectionState,
    reconnect_delay: Duration,
    reconnect_pending: bool,
    attempts: u64,
    transport: T,
    timer: R,
}

impl<T: Transport, R: ReconnectTimer> ConnectionManager<T, R> {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration, transport: T, timer: R) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Disconnected,
            reconnect_delay,
            reconnect_pending: false,
            attempts: 0,
            transport,
            timer,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Number of times a socket has been opened, including the first
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timer(&self) -> &R {
        &self.timer
    }

    /// Open a socket unless one is already open or opening.
    pub fn connect(&mut self) -> ConnectionOutcome {
        if self.state != ConnectionState::Disconnected {
            debug!(state = %self.state, "connect ignored, socket already active");
            return ConnectionOutcome::Unchanged;
        }

        self.state = ConnectionState::Connecting;
        self.attempts += 1;
        info!(url = %self.url, attempt = self.attempts, "Connecting to WebSocket");

        match self.transport.open(&self.url) {
            Ok(()) => ConnectionOutcome::Transitioned(ConnectionState::Connecting),
            Err(e) => {
                warn!(error = %e, "socket creation failed");
                self.state = ConnectionState::Disconnected;
                self.schedule_reconnect();
                ConnectionOutcome::ConnectFailed(e)
            }
        }
    }

    pub fn handle_event(&mut self, event: TransportEvent) -> ConnectionOutcome {
        match event {
            TransportEvent::Opened => {
                if self.state != ConnectionState::Connecting {
                    debug!(state = %self.state, "stale open event ignored");
                    return ConnectionOutcome::Unchanged;
                }
                self.state = ConnectionState::Connected;
                info!(url = %self.url, "WebSocket connected");
                ConnectionOutcome::Transitioned(ConnectionState::Connected)
            }
            TransportEvent::Message(text) => {
                if self.state != ConnectionState::Connected {
                    debug!(state = %self.state, "frame received while not connected, dropped");
                    return ConnectionOutcome::Unchanged;
                }
                debug!(len = text.len(), "WebSocket message");
                ConnectionOutcome::Frame(text)
            }
            TransportEvent::Closed { code, reason } => {
                info!(?code, %reason, "WebSocket disconnected");
                let was = self.state;
                self.state = ConnectionState::Disconnected;
                self.schedule_reconnect();
                if was == ConnectionState::Disconnected {
                    ConnectionOutcome::Unchanged
                } else {
                    ConnectionOutcome::Transitioned(ConnectionState::Disconnected)
                }
            }
            TransportEvent::Error(message) => {
                let message = message.unwrap_or_else(|| "Unknown error".to_string());
                warn!(%message, "WebSocket error");
                ConnectionOutcome::Diagnostic(message)
            }
            TransportEvent::ReconnectDue => {
                self.reconnect_pending = false;
                self.connect()
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_pending {
            return;
        }
        self.reconnect_pending = true;
        debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "reconnect scheduled");
        self.timer.schedule(self.reconnect_delay);
    }
}
