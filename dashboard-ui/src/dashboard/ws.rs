use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use dashboard_core::{ReconnectTimer, Transport, TransportError, TransportEvent};
use futures::channel::mpsc::UnboundedSender;
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

/// Where socket callbacks and timer expiries are queued for the session.
pub type EventSink = UnboundedSender<TransportEvent>;

/// Live browser socket plus the closures wired into it. Dropping the
/// runtime detaches every callback and closes the socket.
struct SocketRuntime {
    ws: WebSocket,
    closing: Rc<Cell<bool>>,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl Drop for SocketRuntime {
    fn drop(&mut self) {
        self.closing.set(true);
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

/// `web_sys::WebSocket` behind the core [`Transport`] seam. Each `open`
/// builds a fresh socket; the previous one is never reused.
pub struct WebSocketTransport {
    sink: EventSink,
    runtime: Option<SocketRuntime>,
}

impl WebSocketTransport {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            runtime: None,
        }
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str) -> Result<(), TransportError> {
        self.runtime = None;

        dioxus_logger::tracing::info!("Connecting to WebSocket: {}", url);
        let ws = WebSocket::new(url).map_err(|e| {
            dioxus_logger::tracing::error!("Failed to create WebSocket: {:?}", e);
            TransportError::Create {
                url: url.to_string(),
                reason: format!("{e:?}"),
            }
        })?;

        let closing = Rc::new(Cell::new(false));

        let sink_open = self.sink.clone();
        let on_open = Closure::wrap(Box::new(move |_e: JsValue| {
            let _ = sink_open.unbounded_send(TransportEvent::Opened);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let sink_message = self.sink.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                let text_str = text.as_string().unwrap_or_default();
                dioxus_logger::tracing::debug!("WebSocket message: {}", text_str);
                let _ = sink_message.unbounded_send(TransportEvent::Message(text_str));
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let sink_close = self.sink.clone();
        let closing_for_close = closing.clone();
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            if closing_for_close.get() {
                return;
            }
            let _ = sink_close.unbounded_send(TransportEvent::Closed {
                code: Some(e.code()),
                reason: e.reason(),
            });
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let sink_error = self.sink.clone();
        let on_error = Closure::wrap(Box::new(move |e: JsValue| {
            dioxus_logger::tracing::error!("WebSocket error: {:?}", e);
            let message = js_sys::Reflect::get(&e, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
                .filter(|m| !m.is_empty());
            let _ = sink_error.unbounded_send(TransportEvent::Error(message));
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        self.runtime = Some(SocketRuntime {
            ws,
            closing,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        });
        Ok(())
    }
}

/// Browser `setTimeout` reconnect timer. Timeouts are forgotten once
/// armed, so an expiry always reaches the session.
pub struct GlooReconnectTimer {
    sink: EventSink,
}

impl GlooReconnectTimer {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl ReconnectTimer for GlooReconnectTimer {
    fn schedule(&mut self, delay: Duration) {
        let sink = self.sink.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            let _ = sink.unbounded_send(TransportEvent::ReconnectDue);
        })
        .forget();
    }
}
