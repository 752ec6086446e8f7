use std::time::Duration;

use shared_types::TaskType;

/// Fixed delay between a socket closing and the next connection attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Delay before the one-shot status/info probes at startup
pub const DEFAULT_STATUS_PROBE_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub reconnect_delay: Duration,
    pub socket_path: String,
    pub api_prefix: String,
    pub status_probe_delay: Duration,
    pub log_capacity: usize,
    pub default_task_type: TaskType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            socket_path: "/ws".to_string(),
            api_prefix: "/api/ml".to_string(),
            status_probe_delay: DEFAULT_STATUS_PROBE_DELAY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            default_task_type: TaskType::default(),
        }
    }
}

impl ClientConfig {
    /// Socket URL for a page served from `origin`
    pub fn socket_url(&self, origin: &str) -> String {
        socket_url_for_origin(origin, &self.socket_path)
    }

    /// Absolute (or origin-relative when `origin` is empty) API endpoint URL
    pub fn api_url(&self, origin: &str, endpoint: &str) -> String {
        format!(
            "{}{}/{}",
            origin.trim_end_matches('/'),
            self.api_prefix,
            endpoint.trim_start_matches('/')
        )
    }
}

/// Map an HTTP origin onto the matching socket scheme: `https` pages get
/// `wss`, everything else gets plain `ws`. A bare host is treated as plain.
pub fn socket_url_for_origin(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let base = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if origin.starts_with("ws://") || origin.starts_with("wss://") {
        origin.to_string()
    } else {
        format!("ws://{origin}")
    };

    format!("{base}/{}", path.trim_start_matches('/'))
}
