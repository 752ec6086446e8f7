//! Shared types between the compute service and its dashboard clients
//!
//! These types are used by both:
//! - the native headless monitor
//! - the Dioxus dashboard (WASM)
//!
//! Serializable with serde for JSON over WebSocket/HTTP

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// Server-assigned task identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle status carried by a task notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Started,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Started => "started",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "started" => Some(TaskStatus::Started),
            "completed" => Some(TaskStatus::Completed),
            "error" => Some(TaskStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computation requested from the service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Multiply,
    Square,
    Sqrt,
    Default,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Multiply,
        TaskType::Square,
        TaskType::Sqrt,
        TaskType::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Multiply => "multiply",
            TaskType::Square => "square",
            TaskType::Sqrt => "sqrt",
            TaskType::Default => "default",
        }
    }

    /// Human-readable label for selection widgets
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Multiply => "Multiply by 2",
            TaskType::Square => "Square",
            TaskType::Sqrt => "Square root",
            TaskType::Default => "Server default",
        }
    }
}

impl FromStr for TaskType {
    type Err = std::convert::Infallible;

    /// Unknown names map to `Default`, mirroring the server.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "multiply" => TaskType::Multiply,
            "square" => TaskType::Square,
            "sqrt" => TaskType::Sqrt,
            _ => TaskType::Default,
        })
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Socket Protocol
// ============================================================================

/// Status-specific payload of a task notification
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPayload {
    /// Input values (started) or result values (completed)
    Values(Vec<f64>),
    /// Server-reported failure
    Failure { message: String },
}

/// Decoded task notification
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub payload: TaskPayload,
}

impl TaskEvent {
    pub fn started(task_id: impl Into<TaskId>, values: Vec<f64>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Started,
            payload: TaskPayload::Values(values),
        }
    }

    pub fn completed(task_id: impl Into<TaskId>, values: Vec<f64>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Completed,
            payload: TaskPayload::Values(values),
        }
    }

    pub fn error(task_id: impl Into<TaskId>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Error,
            payload: TaskPayload::Failure {
                message: message.into(),
            },
        }
    }

    /// Encode as a socket text frame: `{taskId, status, data}`
    pub fn to_frame(&self) -> String {
        let data = match &self.payload {
            TaskPayload::Values(values) => serde_json::json!(values),
            TaskPayload::Failure { message } => serde_json::json!({ "error": message }),
        };
        serde_json::json!({
            "taskId": self.task_id,
            "status": self.status,
            "data": data,
        })
        .to_string()
    }
}

// ============================================================================
// HTTP API Types
// ============================================================================

/// Body of `POST /api/ml/compute`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub data: Vec<f64>,
    pub task_type: TaskType,
}

/// Success response of `POST /api/ml/compute`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResponse {
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<f64>>,
}

impl ComputeResponse {
    /// Result values when the server fulfilled the task synchronously
    pub fn inline_result(&self) -> Option<&[f64]> {
        match (self.status.as_deref(), self.result.as_deref()) {
            (Some("completed"), Some(result)) if !result.is_empty() => Some(result),
            _ => None,
        }
    }

    /// Failure text when the server answered 200 but reported `error: <why>`
    /// in `status`
    pub fn failure_message(&self) -> Option<&str> {
        let status = self.status.as_deref()?;
        let detail = status.strip_prefix("error")?;
        let detail = detail.trim_start_matches(':').trim();
        Some(if detail.is_empty() { "unknown error" } else { detail })
    }
}

/// Response of `GET /api/ml/info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SystemInfo {
    pub system: String,
    pub version: String,
    pub description: String,
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}
