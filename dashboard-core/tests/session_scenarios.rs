//! ClientSession scenarios driven through a scripted transport and a
//! virtual clock, with no real socket involved.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dashboard_core::{
    ClientConfig, ClientSession, ConnectionState, ProbeFailure, ReconnectTimer, Sample,
    Transport, TransportError, TransportEvent,
};
use shared_types::{ComputeResponse, SystemInfo, TaskEvent, TaskStatus, TaskType};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct Wire {
    opened_at: Vec<Duration>,
    now: Duration,
    timers: Vec<Duration>,
}

type SharedWire = Rc<RefCell<Wire>>;

struct FakeTransport(SharedWire);

impl Transport for FakeTransport {
    fn open(&mut self, _url: &str) -> Result<(), TransportError> {
        let mut wire = self.0.borrow_mut();
        let now = wire.now;
        wire.opened_at.push(now);
        Ok(())
    }
}

struct VirtualTimer(SharedWire);

impl ReconnectTimer for VirtualTimer {
    fn schedule(&mut self, delay: Duration) {
        let mut wire = self.0.borrow_mut();
        let due = wire.now + delay;
        wire.timers.push(due);
    }
}

type Session = ClientSession<FakeTransport, VirtualTimer>;

struct Harness {
    wire: SharedWire,
    session: Session,
}

impl Harness {
    fn new() -> Self {
        let wire: SharedWire = Rc::new(RefCell::new(Wire::default()));
        let session = ClientSession::new(
            &ClientConfig::default(),
            "ws://localhost:8080/ws",
            FakeTransport(wire.clone()),
            VirtualTimer(wire.clone()),
        );
        Self { wire, session }
    }

    fn connected() -> Self {
        let mut h = Self::new();
        h.session.connect();
        h.session.handle_transport_event(TransportEvent::Opened);
        h
    }

    /// Advance the virtual clock, firing every timer that comes due.
    fn advance(&mut self, by: Duration) {
        let target = self.wire.borrow().now + by;
        loop {
            let next_due = {
                let wire = self.wire.borrow();
                wire.timers.iter().copied().filter(|t| *t <= target).min()
            };
            let Some(due) = next_due else {
                break;
            };
            {
                let mut wire = self.wire.borrow_mut();
                wire.now = due;
                if let Some(pos) = wire.timers.iter().position(|t| *t == due) {
                    wire.timers.remove(pos);
                }
            }
            self.session
                .handle_transport_event(TransportEvent::ReconnectDue);
        }
        self.wire.borrow_mut().now = target;
    }

    fn frame(&mut self, raw: &str) {
        self.session
            .handle_transport_event(TransportEvent::Message(raw.to_string()));
    }

    fn submit(&mut self, raw: &str, response: ComputeResponse) {
        let request = self
            .session
            .prepare_submission(raw, Some(TaskType::Multiply))
            .expect("valid input");
        self.session.complete_submission(&request, &response);
    }

    fn open_count(&self) -> usize {
        self.wire.borrow().opened_at.len()
    }

    fn log_messages(&self) -> Vec<String> {
        self.session
            .log()
            .lines()
            .map(|l| l.message.clone())
            .collect()
    }
}

fn closed() -> TransportEvent {
    TransportEvent::Closed {
        code: Some(1006),
        reason: "abnormal".to_string(),
    }
}

fn accepted(task_id: &str) -> ComputeResponse {
    ComputeResponse {
        task_id: task_id.into(),
        status: Some("started".to_string()),
        result: None,
    }
}

fn unknowns(n: usize) -> Vec<Sample> {
    vec![Sample::Unknown; n]
}

// ============================================================================
// Connection resilience
// ============================================================================

#[test]
fn open_and_close_are_logged() {
    let mut h = Harness::connected();
    assert_eq!(h.session.connection_state(), ConnectionState::Connected);

    let update = h.session.handle_transport_event(closed());
    assert_eq!(update.connection, Some(ConnectionState::Disconnected));
    assert_eq!(
        h.log_messages(),
        vec![
            "Connected to compute server".to_string(),
            "Disconnected from server".to_string(),
        ]
    );
}

#[test]
fn reconnects_once_after_fixed_delay() {
    let mut h = Harness::connected();
    h.session.handle_transport_event(closed());

    h.advance(Duration::from_millis(4_999));
    assert_eq!(h.open_count(), 1);

    h.advance(Duration::from_millis(1));
    assert_eq!(h.open_count(), 2);
    assert_eq!(h.session.connection_state(), ConnectionState::Connecting);

    h.advance(Duration::from_secs(60));
    assert_eq!(h.open_count(), 2, "no further attempt without another close");
}

#[test]
fn reconnects_indefinitely_at_fixed_spacing() {
    let mut h = Harness::connected();

    for _ in 0..25 {
        h.session.handle_transport_event(closed());
        h.advance(Duration::from_secs(5));
    }

    let opened = h.wire.borrow().opened_at.clone();
    assert_eq!(opened.len(), 26);
    for pair in opened[1..].windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
    }
}

#[test]
fn error_alone_never_reconnects() {
    let mut h = Harness::connected();
    h.session
        .handle_transport_event(TransportEvent::Error(Some("reset".to_string())));
    h.advance(Duration::from_secs(30));

    assert_eq!(h.open_count(), 1);
    assert_eq!(h.session.connection_state(), ConnectionState::Connected);
    assert_eq!(h.log_messages().last().unwrap(), "WebSocket Error: reset");
}

#[test]
fn error_then_close_schedules_one_timer() {
    let mut h = Harness::connected();
    h.session.handle_transport_event(TransportEvent::Error(None));
    h.session.handle_transport_event(closed());
    h.session.handle_transport_event(closed());

    assert_eq!(h.wire.borrow().timers.len(), 1);
    h.advance(Duration::from_secs(5));
    assert_eq!(h.open_count(), 2);
}

#[test]
fn late_timer_after_manual_reconnect_is_harmless() {
    let mut h = Harness::connected();
    h.session.handle_transport_event(closed());

    h.session.connect();
    h.session.handle_transport_event(TransportEvent::Opened);
    assert_eq!(h.open_count(), 2);

    h.advance(Duration::from_secs(5));
    assert_eq!(h.open_count(), 2);
    assert_eq!(h.session.connection_state(), ConnectionState::Connected);
}

// ============================================================================
// Routing and series
// ============================================================================

#[test]
fn submission_without_inline_result_shows_pending_bars() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("t1"));

    let series = h.session.series();
    assert_eq!(series.input, vec![1.0, 2.0, 3.0]);
    assert_eq!(series.result, unknowns(3));
    assert_eq!(h.session.active_task().map(|t| t.as_str()), Some("t1"));
}

#[test]
fn completed_event_fills_results_for_active_task() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("t1"));

    h.frame(r#"{"taskId":"t1","status":"completed","data":[9,9,9]}"#);

    assert_eq!(
        h.session.series().result,
        vec![Sample::Known(9.0), Sample::Known(9.0), Sample::Known(9.0)]
    );
    assert_eq!(h.session.task_status(&"t1".into()), Some(TaskStatus::Completed));
}

#[test]
fn mismatched_completed_event_is_rejected() {
    let mut h = Harness::connected();
    h.submit("1,2", accepted("t1"));
    let before = h.session.series();
    let mark = h.session.log().next_seq();

    h.frame(r#"{"taskId":"t1","status":"completed","data":[9,9,9]}"#);

    assert_eq!(*h.session.series(), *before);
    let rejections: Vec<_> = h
        .session
        .log_lines_since(mark)
        .into_iter()
        .filter(|l| l.message.starts_with("Ignoring result"))
        .collect();
    assert_eq!(rejections.len(), 1);
    assert_eq!(
        rejections[0].message,
        "Ignoring result for task t1: expected 2 values, got 3"
    );
}

#[test]
fn background_error_is_recorded_but_not_drawn() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("t1"));
    let before = h.session.series();
    let mark = h.session.log().next_seq();

    h.frame(r#"{"taskId":"t2","status":"error","data":{"error":"bad input"}}"#);

    assert_eq!(h.session.task_status(&"t2".into()), Some(TaskStatus::Error));
    assert_eq!(*h.session.series(), *before);
    let fresh = h.session.log_lines_since(mark);
    assert_eq!(fresh.len(), 1);
    assert!(fresh[0].message.contains("bad input"));
}

#[test]
fn active_task_error_leaves_chart_untouched() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("t1"));
    let revision = h.session.series_revision();
    let before = h.session.series();
    let mark = h.session.log().next_seq();

    h.frame(r#"{"taskId":"t1","status":"error","data":{"error":"division by zero"}}"#);

    assert_eq!(h.session.task_status(&"t1".into()), Some(TaskStatus::Error));
    assert_eq!(h.session.series_revision(), revision);
    assert_eq!(*h.session.series(), *before);
    assert_eq!(h.session.series().result, unknowns(3));
    let fresh = h.session.log_lines_since(mark);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].message, "Task t1: error - Error: division by zero");
}

#[test]
fn error_status_in_http_reply_is_logged_without_pending_bars() {
    let mut h = Harness::connected();
    h.submit("1,2", accepted("t1"));
    h.frame(&TaskEvent::completed("t1", vec![2.0, 4.0]).to_frame());
    let revision = h.session.series_revision();

    h.submit(
        "5,6,7",
        ComputeResponse {
            task_id: "t2".into(),
            status: Some("error: GPU service unavailable".to_string()),
            result: None,
        },
    );

    assert_eq!(
        h.log_messages().last().map(String::as_str),
        Some("Error: GPU service unavailable")
    );
    assert_eq!(h.session.active_task(), Some(&"t1".into()));
    assert_eq!(h.session.series_revision(), revision);
    assert_eq!(h.session.series().input, vec![1.0, 2.0]);
}

#[test]
fn superseded_task_keeps_status_but_not_chart() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("old"));
    h.submit("4,5", accepted("new"));
    let revision = h.session.series_revision();

    h.frame(&TaskEvent::started("old", vec![7.0, 7.0, 7.0, 7.0]).to_frame());
    h.frame(&TaskEvent::completed("old", vec![1.0, 1.0, 1.0, 1.0]).to_frame());

    assert_eq!(h.session.task_status(&"old".into()), Some(TaskStatus::Completed));
    assert_eq!(h.session.series_revision(), revision);
    assert_eq!(h.session.series().input, vec![4.0, 5.0]);
}

#[test]
fn unrecognised_frames_only_log() {
    let mut h = Harness::connected();
    h.submit("1", accepted("t1"));
    let revision = h.session.series_revision();

    for raw in [
        "Connected to ML Hybrid System WebSocket",
        "{not json",
        r#"{"status":"completed","data":[1]}"#,
        r#"{"hello":"world"}"#,
    ] {
        let mark = h.session.log().next_seq();
        h.frame(raw);

        let fresh = h.session.log_lines_since(mark);
        assert_eq!(fresh.len(), 1, "{raw}");
        assert_eq!(fresh[0].message, raw);
    }

    assert_eq!(h.session.registry().len(), 0);
    assert_eq!(h.session.series_revision(), revision);
}

#[test]
fn started_event_rebuilds_series_for_active_task() {
    let mut h = Harness::connected();
    h.submit("1,2,3", accepted("t1"));
    h.frame(&TaskEvent::completed("t1", vec![2.0, 4.0, 6.0]).to_frame());

    h.frame(&TaskEvent::started("t1", vec![8.0, 9.0]).to_frame());

    let series = h.session.series();
    assert_eq!(series.input, vec![8.0, 9.0]);
    assert_eq!(series.result, unknowns(2));
}

#[test]
fn inline_and_socket_results_converge() {
    let mut inline = Harness::connected();
    inline.submit(
        "1,2,3",
        ComputeResponse {
            task_id: "t1".into(),
            status: Some("completed".to_string()),
            result: Some(vec![2.0, 4.0, 6.0]),
        },
    );

    let mut socket = Harness::connected();
    socket.submit("1,2,3", accepted("t1"));
    socket.frame(&TaskEvent::started("t1", vec![1.0, 2.0, 3.0]).to_frame());
    socket.frame(&TaskEvent::completed("t1", vec![2.0, 4.0, 6.0]).to_frame());

    assert_eq!(*inline.session.series(), *socket.session.series());
    assert_eq!(
        inline.session.series().result,
        vec![Sample::Known(2.0), Sample::Known(4.0), Sample::Known(6.0)]
    );

    // A socket echo of the same result after the inline one changes nothing.
    inline.frame(&TaskEvent::completed("t1", vec![2.0, 4.0, 6.0]).to_frame());
    assert_eq!(*inline.session.series(), *socket.session.series());
}

#[test]
fn frames_still_route_across_reconnects() {
    let mut h = Harness::connected();
    h.submit("1,2", accepted("t1"));

    h.session.handle_transport_event(closed());
    h.advance(Duration::from_secs(5));
    h.session.handle_transport_event(TransportEvent::Opened);

    h.frame(&TaskEvent::completed("t1", vec![3.0, 3.0]).to_frame());
    assert_eq!(h.session.series().known_results(), 2);
}

// ============================================================================
// Submission and probes
// ============================================================================

#[test]
fn invalid_submission_is_rejected_locally() {
    let mut h = Harness::connected();
    h.submit("5,6", accepted("t1"));
    let before = h.session.series();

    let err = h.session.prepare_submission("abc, , x", None);

    assert!(err.is_err());
    assert_eq!(*h.session.series(), *before);
    assert_eq!(h.session.active_task().map(|t| t.as_str()), Some("t1"));
    assert_eq!(
        h.log_messages().last().unwrap(),
        "Error: Please provide valid numeric data"
    );
}

#[test]
fn failed_submission_logs_body_verbatim() {
    let mut h = Harness::new();
    h.session.fail_submission("Internal Server Error: gRPC unavailable");
    assert_eq!(
        h.log_messages(),
        vec!["Error: Internal Server Error: gRPC unavailable".to_string()]
    );
    assert!(h.session.active_task().is_none());
}

#[test]
fn status_and_info_replies_are_logged() {
    let mut h = Harness::new();
    h.session
        .record_status_probe(Ok("ML Hybrid System is running".to_string()));
    h.session.record_status_probe(Err(ProbeFailure::Status(503)));
    h.session.record_system_info(&SystemInfo {
        system: "ML Hybrid Java-Rust".to_string(),
        version: "1.0.0".to_string(),
        description: "Distributed computing system for machine learning".to_string(),
        ..Default::default()
    });

    assert_eq!(
        h.log_messages(),
        vec![
            "System status: ML Hybrid System is running".to_string(),
            "System status check failed".to_string(),
            "System: ML Hybrid Java-Rust v1.0.0".to_string(),
            "Description: Distributed computing system for machine learning".to_string(),
        ]
    );
}
