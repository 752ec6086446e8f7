use std::future::Future;

use dashboard_core::{ClientSession, ProbeFailure, TransportEvent};
use shared_types::{ComputeRequest, ComputeResponse, SystemInfo};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::MonitorConfig;
use crate::transport::{TokioReconnectTimer, TokioTransport};

pub type MonitorSession = ClientSession<TokioTransport, TokioReconnectTimer>;

/// Result of an HTTP call made on its own task, handed back to the loop
#[derive(Debug)]
pub enum ApiOutcome {
    Status(Result<String, ProbeFailure>),
    Info(Result<SystemInfo, ProbeFailure>),
    Submitted {
        request: ComputeRequest,
        result: Result<ComputeResponse, ApiError>,
    },
}

/// Terminal rendition of the dashboard: every new log line and every chart
/// change is written through `tracing` under the `dashboard` target.
///
/// HTTP calls never run on the loop itself; socket frames and reconnect
/// timers keep flowing while a request is outstanding.
pub struct Monitor {
    config: MonitorConfig,
    session: MonitorSession,
    events: UnboundedReceiver<TransportEvent>,
    outcomes_tx: UnboundedSender<ApiOutcome>,
    outcomes: UnboundedReceiver<ApiOutcome>,
    api: ApiClient,
    printed_seq: u64,
    printed_revision: u64,
}

impl Monitor {
    /// Must be called inside a tokio runtime; the transport spawns tasks.
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let session = ClientSession::new(
            &config.client,
            config.socket_url(),
            TokioTransport::new(tx.clone()),
            TokioReconnectTimer::new(tx),
        );
        let api = ApiClient::new(config.server_url.clone(), config.client.clone())?;
        let (outcomes_tx, outcomes) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            session,
            events,
            outcomes_tx,
            outcomes,
            api,
            printed_seq: 0,
            printed_revision: 0,
        })
    }

    pub fn session(&self) -> &MonitorSession {
        &self.session
    }

    pub fn connect(&mut self) {
        self.session.connect();
        self.flush();
    }

    /// Wait for the next socket event, timer expiry or finished HTTP call
    /// and apply it. Returns `false` once nothing more can arrive.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            Some(event) = self.events.recv() => {
                debug!(?event, "transport event");
                self.session.handle_transport_event(event);
            }
            Some(outcome) = self.outcomes.recv() => {
                self.apply_outcome(outcome);
            }
            else => return false,
        }
        self.flush();
        true
    }

    /// Fetch status, then info, on a background task.
    pub fn fetch_server_info(&self) {
        let api = self.api.clone();
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let _ = outcomes.send(ApiOutcome::Status(api.fetch_status().await));
            let _ = outcomes.send(ApiOutcome::Info(api.fetch_system_info().await));
        });
    }

    /// Validate locally, then send on a background task. Returns `false`
    /// when the input was rejected before any request was made.
    pub fn submit(&mut self, raw: &str) -> bool {
        let request = match self
            .session
            .prepare_submission(raw, Some(self.config.task_type))
        {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "submission rejected locally");
                self.flush();
                return false;
            }
        };

        let api = self.api.clone();
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = api.submit_compute(&request).await;
            let _ = outcomes.send(ApiOutcome::Submitted { request, result });
        });
        true
    }

    fn apply_outcome(&mut self, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Status(result) => self.session.record_status_probe(result),
            ApiOutcome::Info(Ok(info)) => {
                self.session.record_system_info(&info);
                for (name, state) in &info.components {
                    debug!(component = %name, state = %state, "system component");
                }
            }
            ApiOutcome::Info(Err(e)) => self.session.record_info_failure(e),
            ApiOutcome::Submitted {
                request,
                result: Ok(response),
            } => {
                self.session.complete_submission(&request, &response);
            }
            ApiOutcome::Submitted { result: Err(e), .. } => {
                warn!(error = %e, "computation request failed");
                self.session.fail_submission(&e.to_string());
            }
        }
    }

    /// Connect, fetch status and info once after the configured delay,
    /// optionally submit, then follow events until `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        tokio::pin!(shutdown);

        self.connect();

        let startup_delay = tokio::time::sleep(self.config.client.status_probe_delay);
        tokio::pin!(startup_delay);
        let mut started = false;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("monitor shutting down");
                    return Ok(());
                }
                _ = &mut startup_delay, if !started => {
                    started = true;
                    self.fetch_server_info();
                    if let Some(raw) = self.config.submit.clone() {
                        self.submit(&raw);
                    }
                }
                progressed = self.step() => {
                    if !progressed {
                        anyhow::bail!("monitor input channels closed");
                    }
                }
            }
        }
    }

    /// Emit log lines and chart changes not yet written out.
    fn flush(&mut self) {
        for line in self.session.log_lines_since(self.printed_seq) {
            info!(target: "dashboard", "{line}");
            self.printed_seq = line.seq + 1;
        }

        let revision = self.session.series_revision();
        if revision != self.printed_revision {
            self.printed_revision = revision;
            let series = self.session.series();
            let results: Vec<String> = series.result.iter().map(ToString::to_string).collect();
            info!(
                target: "dashboard",
                task_id = ?self.session.active_task().map(|t| t.as_str()),
                input = ?series.input,
                result = %results.join(", "),
                "chart updated"
            );
        }
    }
}
