//! ctp-sentinel application crate.
//!
//! Wires the event bus, session scheduler, query loop, and risk context
//! around a concrete in-process [`host::SentinelHost`].

pub mod app;
pub mod config;
pub mod error;
pub mod host;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use host::SentinelHost;
