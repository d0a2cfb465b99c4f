//! In-process host implementation.
//!
//! `SentinelHost` owns the extension registry and the run/query flags.
//! It is the single point of extension mutation; only the scheduler
//! calls enable/suspend, and each loop reads only its own stop flag.

use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use ctp_host::{parse_ext_registration, ExtensionId, HostError, HostFlags, HostResult, TradeHost};

/// Extension service state inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtensionStatus {
    Enabled,
    Suspended,
}

/// Concrete host backing the scheduler and query loop.
pub struct SentinelHost {
    flags: HostFlags,
    registry: DashMap<ExtensionId, ExtensionStatus>,
    refresh_interval: RwLock<Duration>,
    reload_generation: RwLock<u64>,
}

impl SentinelHost {
    /// Create a host with a starting extension set, all suspended.
    #[must_use]
    pub fn new(extensions: Vec<ExtensionId>, refresh_interval: Duration) -> Self {
        let registry = DashMap::new();
        for id in extensions {
            registry.insert(id, ExtensionStatus::Suspended);
        }
        Self {
            flags: HostFlags::new(),
            registry,
            refresh_interval: RwLock::new(refresh_interval),
            reload_generation: RwLock::new(0),
        }
    }

    /// Register an extension from a `[name, settings]` payload.
    ///
    /// The payload shape is validated before the registry is touched;
    /// a malformed payload never leaves a half-registered extension.
    pub fn register_extension(&self, payload: &Value) -> HostResult<ExtensionId> {
        let (id, settings) = parse_ext_registration(payload)?;
        debug!(extension = %id, ?settings, "extension registered");
        self.registry.insert(id.clone(), ExtensionStatus::Suspended);
        Ok(id)
    }

    /// The host's run/query flags.
    #[must_use]
    pub fn flags(&self) -> &HostFlags {
        &self.flags
    }

    /// Update the query spacing; the loop picks it up next cycle.
    pub fn set_refresh_interval(&self, interval: Duration) {
        *self.refresh_interval.write() = interval;
    }

    /// Extensions currently enabled.
    #[must_use]
    pub fn enabled_extensions(&self) -> Vec<ExtensionId> {
        self.registry
            .iter()
            .filter(|entry| *entry.value() == ExtensionStatus::Enabled)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// How many reloads have happened.
    #[must_use]
    pub fn reload_generation(&self) -> u64 {
        *self.reload_generation.read()
    }
}

impl TradeHost for SentinelHost {
    fn run_flag(&self) -> bool {
        self.flags.run()
    }

    fn query_flag(&self) -> bool {
        self.flags.query()
    }

    fn reload(&self) {
        let mut generation = self.reload_generation.write();
        *generation += 1;
        info!(generation = *generation, "host state reloaded");
    }

    fn extensions(&self) -> Vec<ExtensionId> {
        self.registry.iter().map(|entry| entry.key().clone()).collect()
    }

    fn enable_extension(&self, id: &ExtensionId) -> HostResult<()> {
        match self.registry.get_mut(id) {
            Some(mut entry) => {
                *entry.value_mut() = ExtensionStatus::Enabled;
                debug!(extension = %id, "extension enabled");
                Ok(())
            }
            None => Err(HostError::UnknownExtension(id.to_string())),
        }
    }

    fn suspend_extension(&self, id: &ExtensionId) -> HostResult<()> {
        match self.registry.get_mut(id) {
            Some(mut entry) => {
                *entry.value_mut() = ExtensionStatus::Suspended;
                debug!(extension = %id, "extension suspended");
                Ok(())
            }
            None => Err(HostError::UnknownExtension(id.to_string())),
        }
    }

    fn query_position(&self) {
        debug!("position refresh query issued");
    }

    fn query_account(&self) {
        debug!("account refresh query issued");
    }

    fn refresh_interval(&self) -> Duration {
        *self.refresh_interval.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host() -> SentinelHost {
        SentinelHost::new(
            vec![ExtensionId::from("recorder")],
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_initial_extensions_suspended() {
        let host = host();
        assert_eq!(host.extensions().len(), 1);
        assert!(host.enabled_extensions().is_empty());
    }

    #[test]
    fn test_enable_then_suspend() {
        let host = host();
        let id = ExtensionId::from("recorder");

        host.enable_extension(&id).unwrap();
        assert_eq!(host.enabled_extensions(), vec![id.clone()]);

        host.suspend_extension(&id).unwrap();
        assert!(host.enabled_extensions().is_empty());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let host = host();
        let id = ExtensionId::from("ghost");
        assert!(matches!(
            host.enable_extension(&id),
            Err(HostError::UnknownExtension(_))
        ));
    }

    #[test]
    fn test_register_extension_from_payload() {
        let host = host();
        let id = host
            .register_extension(&json!(["strategy", {"lots": 2}]))
            .unwrap();
        assert_eq!(id.as_str(), "strategy");
        assert_eq!(host.extensions().len(), 2);
    }

    #[test]
    fn test_register_rejects_bad_payload() {
        let host = host();
        let err = host.register_extension(&json!("strategy")).unwrap_err();
        assert!(matches!(err, HostError::InvalidRegistration(_)));
        // Registry untouched
        assert_eq!(host.extensions().len(), 1);
    }

    #[test]
    fn test_reload_bumps_generation() {
        let host = host();
        assert_eq!(host.reload_generation(), 0);
        host.reload();
        host.reload();
        assert_eq!(host.reload_generation(), 2);
    }

    #[test]
    fn test_refresh_interval_runtime_update() {
        let host = host();
        host.set_refresh_interval(Duration::from_secs(9));
        assert_eq!(host.refresh_interval(), Duration::from_secs(9));
    }
}
