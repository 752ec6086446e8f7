use dashboard_core::{ClientConfig, TransportEvent};
use dioxus::prelude::*;
use futures::channel::mpsc::UnboundedReceiver;
use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;
use shared_types::ComputeRequest;

use crate::api::{fetch_status, fetch_system_info, submit_compute};
use crate::dashboard::state::{with_session, WebSession};

/// Drain socket and timer events into the session, one at a time, in the
/// order the browser delivered them.
pub async fn pump_transport_events(
    mut events: UnboundedReceiver<TransportEvent>,
    mut session: Signal<Option<WebSession>>,
) {
    while let Some(event) = events.next().await {
        with_session(&mut session, |s| s.handle_transport_event(event));
    }
    dioxus_logger::tracing::warn!("transport event channel closed");
}

/// One-shot status and info probes, shown in the log only.
pub async fn run_startup_probes(config: ClientConfig, mut session: Signal<Option<WebSession>>) {
    let delay_ms = u32::try_from(config.status_probe_delay.as_millis()).unwrap_or(u32::MAX);
    TimeoutFuture::new(delay_ms).await;

    let status = fetch_status(&config).await;
    with_session(&mut session, |s| s.record_status_probe(status));

    match fetch_system_info(&config).await {
        Ok(info) => {
            with_session(&mut session, |s| s.record_system_info(&info));
        }
        Err(e) => {
            with_session(&mut session, |s| s.record_info_failure(e));
        }
    }
}

/// Send a validated request and hand the outcome to the session.
pub async fn submit_computation(
    config: ClientConfig,
    request: ComputeRequest,
    mut session: Signal<Option<WebSession>>,
    mut submitting: Signal<bool>,
) {
    submitting.set(true);

    match submit_compute(&config, &request).await {
        Ok(response) => {
            with_session(&mut session, |s| s.complete_submission(&request, &response));
        }
        Err(e) => {
            dioxus_logger::tracing::error!("Failed to submit computation: {}", e);
            with_session(&mut session, |s| s.fail_submission(&e));
        }
    }

    submitting.set(false);
}

/// Keep the newest log line in view.
pub fn scroll_to_bottom(element_id: &str) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id))
    else {
        return;
    };
    element.set_scroll_top(element.scroll_height());
}
