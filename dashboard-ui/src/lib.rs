pub mod api;
pub mod components;
pub mod dashboard;

pub use api::*;
pub use components::*;
pub use dashboard::*;
