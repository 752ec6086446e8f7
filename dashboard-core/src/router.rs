//! Inbound frame classification and task-aware dispatch.
//!
//! Every decoded task event is recorded and logged; only events for the
//! active task reach the series.

use shared_types::{TaskEvent, TaskId, TaskPayload, TaskStatus};
use tracing::{debug, warn};

use crate::event_log::EventLog;
use crate::registry::TaskRegistry;
use crate::series::SeriesSynchronizer;

/// What a raw socket frame turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Task(TaskEvent),
    /// Anything that is not a recognisable task event; shown verbatim.
    Text(String),
}

pub fn classify_frame(raw: &str) -> Inbound {
    match parse_task_event(raw) {
        Some(event) => Inbound::Task(event),
        None => Inbound::Text(raw.to_string()),
    }
}

/// Decode `{taskId, status, data}`. Returns `None` for non-JSON, a missing,
/// empty or non-string `taskId`, an unrecognised status, or a started/completed
/// payload that is not an array of numbers.
pub fn parse_task_event(raw: &str) -> Option<TaskEvent> {
    let json = serde_json::from_str::<serde_json::Value>(raw).ok()?;
    let task_id = json
        .get("taskId")?
        .as_str()
        .filter(|id| !id.is_empty())?;
    let status = TaskStatus::parse(json.get("status")?.as_str()?)?;
    let data = json.get("data");

    let payload = match status {
        TaskStatus::Started | TaskStatus::Completed => {
            let values = data?
                .as_array()?
                .iter()
                .map(|v| v.as_f64())
                .collect::<Option<Vec<f64>>>()?;
            TaskPayload::Values(values)
        }
        TaskStatus::Error => TaskPayload::Failure {
            message: data
                .and_then(|d| d.get("error"))
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        },
    };

    Some(TaskEvent {
        task_id: TaskId::new(task_id),
        status,
        payload,
    })
}

/// Human-readable summary of a task event
pub fn describe_event(event: &TaskEvent) -> String {
    let head = format!("Task {}: {}", event.task_id, event.status);
    match (&event.status, &event.payload) {
        (TaskStatus::Started, TaskPayload::Values(values)) => {
            format!("{head} - Processing {} data points", values.len())
        }
        (TaskStatus::Completed, TaskPayload::Values(values)) => {
            format!("{head} - Generated {} results", values.len())
        }
        (_, TaskPayload::Failure { message }) => format!("{head} - Error: {message}"),
        (TaskStatus::Error, TaskPayload::Values(_)) => head,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Logged verbatim, nothing else touched
    PlainText,
    Task {
        task_id: TaskId,
        status: TaskStatus,
        /// The event belonged to the active task
        active: bool,
        series_changed: bool,
    },
}

impl RouteOutcome {
    pub fn series_changed(&self) -> bool {
        matches!(
            self,
            RouteOutcome::Task {
                series_changed: true,
                ..
            }
        )
    }
}

/// Borrowed view over the session state a frame may touch
pub struct EventRouter<'a> {
    pub registry: &'a mut TaskRegistry,
    pub active_task: Option<&'a TaskId>,
    pub series: &'a mut SeriesSynchronizer,
    pub log: &'a mut EventLog,
}

impl EventRouter<'_> {
    pub fn route(&mut self, raw: &str) -> RouteOutcome {
        match classify_frame(raw) {
            Inbound::Text(text) => {
                debug!("plain text frame");
                self.log.push(text);
                RouteOutcome::PlainText
            }
            Inbound::Task(event) => self.dispatch(event),
        }
    }

    pub fn dispatch(&mut self, event: TaskEvent) -> RouteOutcome {
        self.registry.record(event.task_id.clone(), event.status);
        self.log.push(describe_event(&event));

        let active = self.active_task == Some(&event.task_id);
        let series_changed = active && self.apply_to_series(&event);

        RouteOutcome::Task {
            task_id: event.task_id,
            status: event.status,
            active,
            series_changed,
        }
    }

    fn apply_to_series(&mut self, event: &TaskEvent) -> bool {
        match (&event.status, &event.payload) {
            (TaskStatus::Started, TaskPayload::Values(values)) => {
                self.series.set_input(values.clone());
                true
            }
            (TaskStatus::Completed, TaskPayload::Values(values)) => {
                apply_result(self.series, self.log, &event.task_id, values.clone())
            }
            _ => false,
        }
    }
}

/// Apply a result series, logging (not applying) a length mismatch.
pub(crate) fn apply_result(
    series: &mut SeriesSynchronizer,
    log: &mut EventLog,
    task_id: &TaskId,
    values: Vec<f64>,
) -> bool {
    match series.set_result(values) {
        Ok(()) => true,
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "result rejected");
            log.push(format!("Ignoring result for task {task_id}: {e}"));
            false
        }
    }
}
