//! Tokio socket and timer behind the core connection seams. Both report
//! into one unbounded channel that the monitor loop drains.

use std::time::Duration;

use dashboard_core::{ReconnectTimer, Transport, TransportError, TransportEvent};
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

pub type EventSender = UnboundedSender<TransportEvent>;

pub struct TokioTransport {
    events: EventSender,
    reader: Option<JoinHandle<()>>,
}

impl TokioTransport {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            reader: None,
        }
    }
}

impl Drop for TokioTransport {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Transport for TokioTransport {
    fn open(&mut self, url: &str) -> Result<(), TransportError> {
        if let Some(previous) = self.reader.take() {
            previous.abort();
        }

        let request = url
            .into_client_request()
            .map_err(|e| TransportError::Create {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.reader = Some(tokio::spawn(run_socket(request, self.events.clone())));
        Ok(())
    }
}

/// Connect, forward text frames, and always finish with exactly one
/// `Closed` so the connection manager can schedule the next attempt.
async fn run_socket(request: Request, events: EventSender) {
    let mut stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(error = %e, "socket connect failed");
            let _ = events.send(TransportEvent::Error(Some(e.to_string())));
            let _ = events.send(TransportEvent::Closed {
                code: None,
                reason: String::new(),
            });
            return;
        }
    };

    let _ = events.send(TransportEvent::Opened);

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let _ = events.send(TransportEvent::Message(text));
            }
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (Some(u16::from(f.code)), f.reason.into_owned()))
                    .unwrap_or((None, String::new()));
                let _ = events.send(TransportEvent::Closed { code, reason });
                return;
            }
            Ok(other) => {
                debug!(kind = ?other, "ignoring non-text frame");
            }
            Err(e) => {
                let _ = events.send(TransportEvent::Error(Some(e.to_string())));
                break;
            }
        }
    }

    let _ = events.send(TransportEvent::Closed {
        code: None,
        reason: String::new(),
    });
}

pub struct TokioReconnectTimer {
    events: EventSender,
}

impl TokioReconnectTimer {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}

impl ReconnectTimer for TokioReconnectTimer {
    fn schedule(&mut self, delay: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(TransportEvent::ReconnectDue);
        });
    }
}
