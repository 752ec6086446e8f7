//! Client-side core of the compute dashboard.
//!
//! Everything here is transport-agnostic: the browser front end and the
//! native monitor plug their own socket and timer into a [`ClientSession`]
//! and feed every socket callback through
//! [`ClientSession::handle_transport_event`].

pub mod config;
pub mod connection;
pub mod event_log;
pub mod registry;
pub mod router;
pub mod series;
pub mod session;
pub mod submission;

pub use config::*;
pub use connection::*;
pub use event_log::*;
pub use registry::*;
pub use router::*;
pub use series::*;
pub use session::*;
pub use submission::*;
