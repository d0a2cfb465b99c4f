//! Host collaborator boundary.
//!
//! The scheduler and query loop never own extension state; they drive a
//! [`TradeHost`] that knows how to reload itself, enumerate extensions,
//! enable/suspend them, and issue position/account refresh queries.

pub mod error;
pub mod extension;
pub mod host;
pub mod recording;

pub use error::{HostError, HostResult};
pub use extension::{parse_ext_registration, ExtensionId};
pub use host::{DynTradeHost, HostFlags, TradeHost};
pub use recording::{recording_host, RecordingHost};
