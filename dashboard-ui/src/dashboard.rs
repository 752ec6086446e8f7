//! Dashboard page: one client session shared by the socket pump, the
//! startup probes and the submit form.

pub mod effects;
pub mod state;
pub mod ws;

use dashboard_core::ClientConfig;
use dioxus::prelude::*;
use futures::channel::mpsc;
use shared_types::TaskType;

use crate::components::{
    ComputeForm, ConnectionIndicator, LogPanel, SeriesChart, TaskList, DASHBOARD_STYLES,
};
use effects::{pump_transport_events, run_startup_probes, scroll_to_bottom, submit_computation};
use state::{
    chart_bars, log_grew, new_web_session, with_session, WebSession, LOG_MESSAGES_ID,
};

#[component]
pub fn Dashboard() -> Element {
    let config = use_signal(ClientConfig::default);
    let mut session = use_signal(|| None::<WebSession>);
    let submitting = use_signal(|| false);

    // Open the socket once; later re-runs find the session already in place.
    use_effect(move || {
        if session.peek().is_some() {
            return;
        }

        let config = config.peek().clone();
        let (sink, events) = mpsc::unbounded();
        let mut web_session = new_web_session(&config, sink);
        web_session.connect();
        session.set(Some(web_session));

        spawn(pump_transport_events(events, session));
        spawn(run_startup_probes(config, session));
    });

    // Runs after each render that changed the session; follow new log lines.
    let mut scrolled_to = use_signal(|| 0u64);
    use_effect(move || {
        let Some(next_seq) = session.read().as_ref().map(|s| s.log().next_seq()) else {
            return;
        };
        if log_grew(*scrolled_to.peek(), next_seq) {
            scrolled_to.set(next_seq);
            scroll_to_bottom(LOG_MESSAGES_ID);
        }
    });

    let on_submit = use_callback(move |(raw, task_type): (String, TaskType)| {
        if submitting() {
            return;
        }
        let Some(prepared) =
            with_session(&mut session, |s| s.prepare_submission(&raw, Some(task_type)))
        else {
            return;
        };
        match prepared {
            Ok(request) => {
                spawn(submit_computation(config(), request, session, submitting));
            }
            Err(e) => {
                dioxus_logger::tracing::warn!("Rejected submission: {}", e);
            }
        }
    });

    let on_clear = use_callback(move |_: ()| {
        with_session(&mut session, |s| s.clear_log());
    });

    let current = session.read();
    let Some(current) = current.as_ref() else {
        return rsx! {
            div { class: "empty-state", "Starting..." }
        };
    };

    let connection = current.connection_state();
    let bars = chart_bars(&current.series());
    let lines: Vec<_> = current.log().lines().cloned().collect();
    let entries = current.registry().entries();
    let active = current.active_task().cloned();

    rsx! {
        style { {DASHBOARD_STYLES} }

        div {
            class: "dashboard",

            div {
                class: "dashboard-header",
                h1 { "Compute Dashboard" }
                ConnectionIndicator { state: connection }
            }

            div {
                class: "panel",
                ComputeForm { submitting: submitting(), on_submit }
                SeriesChart { bars }
            }

            div {
                class: "panel",
                TaskList { entries, active }
            }

            div {
                class: "panel log-container",
                LogPanel { lines, on_clear }
            }
        }
    }
}
