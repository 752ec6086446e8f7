use std::time::Duration;

use dashboard_core::{ClientConfig, DEFAULT_LOG_CAPACITY};
use shared_types::TaskType;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Origin of the compute service, e.g. `http://localhost:8080`
    pub server_url: String,
    /// Socket, endpoint and timing settings shared with the browser client
    pub client: ClientConfig,
    /// Comma-separated values to submit once the startup probes ran
    pub submit: Option<String>,
    pub task_type: TaskType,
}

impl MonitorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ClientConfig::default();
        let task_type: TaskType = env_str("DASHBOARD_TASK_TYPE", defaults.default_task_type.as_str())
            .parse()
            .unwrap_or_default();

        let client = ClientConfig {
            reconnect_delay: Duration::from_millis(env_parse(
                "DASHBOARD_RECONNECT_DELAY_MS",
                duration_millis(defaults.reconnect_delay),
            )?),
            status_probe_delay: Duration::from_millis(env_parse(
                "DASHBOARD_STATUS_PROBE_DELAY_MS",
                duration_millis(defaults.status_probe_delay),
            )?),
            log_capacity: env_parse("DASHBOARD_LOG_CAPACITY", DEFAULT_LOG_CAPACITY)?,
            default_task_type: task_type,
            ..defaults
        };

        Ok(Self {
            server_url: env_str("DASHBOARD_SERVER_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            client,
            submit: std::env::var("DASHBOARD_SUBMIT")
                .ok()
                .filter(|raw| !raw.trim().is_empty()),
            task_type,
        })
    }

    pub fn socket_url(&self) -> String {
        self.client.socket_url(&self.server_url)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_follows_server_scheme() {
        let mut config = MonitorConfig {
            server_url: "https://dash.example.com".to_string(),
            client: ClientConfig::default(),
            submit: None,
            task_type: TaskType::Square,
        };
        assert_eq!(config.socket_url(), "wss://dash.example.com/ws");

        config.server_url = "http://127.0.0.1:8080".to_string();
        assert_eq!(config.socket_url(), "ws://127.0.0.1:8080/ws");
    }

    #[test]
    fn env_parse_reports_bad_values() {
        std::env::set_var("DASHBOARD_TEST_BAD_NUMBER", "five");
        let err = env_parse::<u64>("DASHBOARD_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("DASHBOARD_TEST_BAD_NUMBER=five"));
        std::env::remove_var("DASHBOARD_TEST_BAD_NUMBER");

        assert_eq!(env_parse::<u64>("DASHBOARD_TEST_UNSET_NUMBER", 7).unwrap(), 7);
    }
}
