//! The single owned client session: connection, registry, active task,
//! series and log, all reached through one value.

use std::sync::Arc;

use shared_types::{ComputeRequest, ComputeResponse, SystemInfo, TaskId, TaskStatus, TaskType};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::connection::{
    ConnectionManager, ConnectionOutcome, ConnectionState, ReconnectTimer, Transport,
    TransportEvent,
};
use crate::event_log::{EventLog, LogLine};
use crate::registry::TaskRegistry;
use crate::router::{apply_result, EventRouter, RouteOutcome};
use crate::series::{SeriesSnapshot, SeriesSynchronizer};
use crate::submission::{build_compute_request, SubmissionError};

/// What changed while handling one input, for the presentation layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub connection: Option<ConnectionState>,
    pub route: Option<RouteOutcome>,
    pub series_changed: bool,
}

/// Why a startup probe produced no usable answer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("{0}")]
    Request(String),
}

pub struct ClientSession<T, R> {
    connection: ConnectionManager<T, R>,
    registry: TaskRegistry,
    active_task: Option<TaskId>,
    series: SeriesSynchronizer,
    log: EventLog,
    default_task_type: TaskType,
}

impl<T: Transport, R: ReconnectTimer> ClientSession<T, R> {
    pub fn new(config: &ClientConfig, socket_url: impl Into<String>, transport: T, timer: R) -> Self {
        Self {
            connection: ConnectionManager::new(
                socket_url,
                config.reconnect_delay,
                transport,
                timer,
            ),
            registry: TaskRegistry::new(),
            active_task: None,
            series: SeriesSynchronizer::new(),
            log: EventLog::new(config.log_capacity),
            default_task_type: config.default_task_type,
        }
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    pub fn connect(&mut self) -> SessionUpdate {
        let outcome = self.connection.connect();
        self.apply_connection_outcome(outcome)
    }

    /// Single entry point for socket callbacks and the reconnect timer.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> SessionUpdate {
        let outcome = self.connection.handle_event(event);
        self.apply_connection_outcome(outcome)
    }

    fn apply_connection_outcome(&mut self, outcome: ConnectionOutcome) -> SessionUpdate {
        match outcome {
            ConnectionOutcome::Transitioned(state) => {
                match state {
                    ConnectionState::Connected => {
                        self.log.push("Connected to compute server");
                    }
                    ConnectionState::Disconnected => {
                        self.log.push("Disconnected from server");
                    }
                    ConnectionState::Connecting => {}
                }
                SessionUpdate {
                    connection: Some(state),
                    ..Default::default()
                }
            }
            ConnectionOutcome::ConnectFailed(e) => {
                self.log.push(format!("WebSocket Error: {e}"));
                SessionUpdate {
                    connection: Some(ConnectionState::Disconnected),
                    ..Default::default()
                }
            }
            ConnectionOutcome::Frame(raw) => {
                let route = self.route_frame(&raw);
                SessionUpdate {
                    series_changed: route.series_changed(),
                    route: Some(route),
                    ..Default::default()
                }
            }
            ConnectionOutcome::Diagnostic(message) => {
                self.log.push(format!("WebSocket Error: {message}"));
                SessionUpdate::default()
            }
            ConnectionOutcome::Unchanged => SessionUpdate::default(),
        }
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    pub fn route_frame(&mut self, raw: &str) -> RouteOutcome {
        EventRouter {
            registry: &mut self.registry,
            active_task: self.active_task.as_ref(),
            series: &mut self.series,
            log: &mut self.log,
        }
        .route(raw)
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate raw form input before any network call. A rejection is
    /// logged and leaves every other piece of state alone.
    pub fn prepare_submission(
        &mut self,
        raw: &str,
        task_type: Option<TaskType>,
    ) -> Result<ComputeRequest, SubmissionError> {
        let task_type = task_type.unwrap_or(self.default_task_type);
        build_compute_request(raw, task_type).inspect_err(|e| {
            self.log.push(format!("Error: {e}"));
        })
    }

    /// Adopt the server-assigned task as active. An inline completed result
    /// goes through the same series calls a socket event would use. A reply
    /// whose status reports an error is logged and leaves the chart alone.
    pub fn complete_submission(
        &mut self,
        request: &ComputeRequest,
        response: &ComputeResponse,
    ) -> SessionUpdate {
        if let Some(reason) = response.failure_message() {
            warn!(task_id = %response.task_id, reason, "server reported computation failure");
            self.log.push(format!("Error: {reason}"));
            return SessionUpdate::default();
        }

        let task_id = response.task_id.clone();
        info!(task_id = %task_id, "computation submitted");
        self.log
            .push(format!("Computation request sent. Task ID: {task_id}"));
        self.active_task = Some(task_id.clone());

        self.series.set_input(request.data.clone());
        if let Some(result) = response.inline_result() {
            apply_result(&mut self.series, &mut self.log, &task_id, result.to_vec());
        }

        SessionUpdate {
            series_changed: true,
            ..Default::default()
        }
    }

    /// Record a failed submission; `message` is the server body verbatim.
    pub fn fail_submission(&mut self, message: &str) {
        self.log.push(format!("Error: {message}"));
    }

    // ------------------------------------------------------------------
    // Startup probes
    // ------------------------------------------------------------------

    pub fn record_status_probe(&mut self, result: Result<String, ProbeFailure>) {
        match result {
            Ok(text) => self.log.push(format!("System status: {text}")),
            Err(ProbeFailure::Status(code)) => {
                warn!(code, "status probe rejected");
                self.log.push("System status check failed")
            }
            Err(ProbeFailure::Request(e)) => {
                self.log.push(format!("Error checking system status: {e}"))
            }
        };
    }

    pub fn record_system_info(&mut self, info: &SystemInfo) {
        self.log
            .push(format!("System: {} v{}", info.system, info.version));
        self.log.push(format!("Description: {}", info.description));
    }

    /// Info is display-only; a failure is a diagnostic, not a log line.
    pub fn record_info_failure(&self, failure: ProbeFailure) {
        warn!(error = %failure, "system info probe failed");
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &ConnectionManager<T, R> {
        &self.connection
    }

    pub fn active_task(&self) -> Option<&TaskId> {
        self.active_task.as_ref()
    }

    pub fn task_status(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.registry.status_of(task_id)
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn series(&self) -> Arc<SeriesSnapshot> {
        self.series.snapshot()
    }

    pub fn series_revision(&self) -> u64 {
        self.series.revision()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_lines_since(&self, seq: u64) -> Vec<LogLine> {
        self.log.since(seq).cloned().collect()
    }

    pub fn push_log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}
