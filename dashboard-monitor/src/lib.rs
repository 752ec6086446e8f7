pub mod api;
pub mod config;
pub mod runtime;
pub mod transport;

pub use api::{ApiClient, ApiError};
pub use config::MonitorConfig;
pub use runtime::{ApiOutcome, Monitor, MonitorSession};
pub use transport::{TokioReconnectTimer, TokioTransport};
