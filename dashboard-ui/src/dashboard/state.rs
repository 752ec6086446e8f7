use dashboard_core::{ClientConfig, ClientSession, ConnectionState, Sample, SeriesSnapshot};
use dioxus::prelude::*;

use crate::api::socket_url;
use crate::dashboard::ws::{EventSink, GlooReconnectTimer, WebSocketTransport};

pub type WebSession = ClientSession<WebSocketTransport, GlooReconnectTimer>;

pub const DEFAULT_INPUT: &str = "1.0, 2.0, 3.0, 4.0, 5.0";

/// DOM id of the scrolling log container
pub const LOG_MESSAGES_ID: &str = "log-messages";

/// Build the page's one session. Socket callbacks and the reconnect timer
/// both report through `sink`.
pub fn new_web_session(config: &ClientConfig, sink: EventSink) -> WebSession {
    ClientSession::new(
        config,
        socket_url(config),
        WebSocketTransport::new(sink.clone()),
        GlooReconnectTimer::new(sink),
    )
}

/// Run `f` against the session if it has been created.
pub fn with_session<F, T>(session: &mut Signal<Option<WebSession>>, f: F) -> Option<T>
where
    F: FnOnce(&mut WebSession) -> T,
{
    session.write().as_mut().map(f)
}

/// Whether lines were appended since the log was last scrolled into view.
pub fn log_grew(scrolled_to: u64, next_seq: u64) -> bool {
    next_seq > scrolled_to
}

pub fn indicator_class(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connected => "status-indicator connected",
        ConnectionState::Connecting => "status-indicator connecting",
        ConnectionState::Disconnected => "status-indicator disconnected",
    }
}

/// One labelled pair of bars. Heights are percentages of the chart area.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub input_text: String,
    pub input_height: f64,
    pub result_text: String,
    pub result_height: Option<f64>,
}

fn bar_height(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value.abs() / max * 100.0).clamp(0.0, 100.0)
}

fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

pub fn chart_bars(snapshot: &SeriesSnapshot) -> Vec<ChartBar> {
    let max = snapshot.max_magnitude();
    snapshot
        .labels()
        .into_iter()
        .zip(snapshot.input.iter().zip(snapshot.result.iter()))
        .map(|(label, (&input, result))| ChartBar {
            label,
            input_text: format_value(input),
            input_height: bar_height(input, max),
            result_text: match result {
                Sample::Known(v) => format_value(*v),
                Sample::Unknown => "?".to_string(),
            },
            result_height: result.value().map(|v| bar_height(v, max)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_largest_magnitude() {
        let snapshot = SeriesSnapshot {
            input: vec![1.0, 2.0],
            result: vec![Sample::Known(4.0), Sample::Unknown],
        };

        let bars = chart_bars(&snapshot);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "Item 1");
        assert_eq!(bars[0].input_height, 25.0);
        assert_eq!(bars[0].result_height, Some(100.0));
        assert_eq!(bars[0].result_text, "4.00");
        assert_eq!(bars[1].result_height, None);
        assert_eq!(bars[1].result_text, "?");
    }

    #[test]
    fn all_zero_series_draws_flat_bars() {
        let snapshot = SeriesSnapshot {
            input: vec![0.0],
            result: vec![Sample::Known(0.0)],
        };
        let bars = chart_bars(&snapshot);
        assert_eq!(bars[0].input_height, 0.0);
        assert_eq!(bars[0].result_height, Some(0.0));
    }

    #[test]
    fn empty_series_has_no_bars() {
        assert!(chart_bars(&SeriesSnapshot::default()).is_empty());
    }

    #[test]
    fn log_follows_only_new_lines() {
        assert!(log_grew(0, 1));
        assert!(log_grew(4, 6));
        assert!(!log_grew(6, 6));
    }

    #[test]
    fn indicator_class_follows_state() {
        assert!(indicator_class(ConnectionState::Connected).ends_with("connected"));
        assert!(indicator_class(ConnectionState::Disconnected).ends_with("disconnected"));
    }
}
