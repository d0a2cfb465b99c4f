//! Extension identity and registration payload validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HostError, HostResult};

/// Opaque handle the host uses to enable or suspend one extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Create an id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Validate an extension registration payload.
///
/// Registrations arrive as a two-element array: `[name, settings]`.
/// Anything else (wrong shape, non-string name) is rejected before the
/// host sees it.
pub fn parse_ext_registration(payload: &Value) -> HostResult<(ExtensionId, Value)> {
    let items = payload.as_array().ok_or_else(|| {
        HostError::InvalidRegistration(format!(
            "expected a [name, settings] pair, got {payload}"
        ))
    })?;

    if items.len() != 2 {
        return Err(HostError::InvalidRegistration(format!(
            "expected exactly 2 elements, got {}",
            items.len()
        )));
    }

    let name = items[0].as_str().ok_or_else(|| {
        HostError::InvalidRegistration(format!("extension name must be a string, got {}", items[0]))
    })?;

    Ok((ExtensionId::new(name), items[1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_registration() {
        let payload = json!(["recorder", {"depth": 5}]);
        let (id, settings) = parse_ext_registration(&payload).unwrap();
        assert_eq!(id.as_str(), "recorder");
        assert_eq!(settings, json!({"depth": 5}));
    }

    #[test]
    fn test_rejects_non_array() {
        let payload = json!({"name": "recorder"});
        let err = parse_ext_registration(&payload).unwrap_err();
        assert!(matches!(err, HostError::InvalidRegistration(_)));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let payload = json!(["recorder"]);
        assert!(parse_ext_registration(&payload).is_err());

        let payload = json!(["recorder", {}, "extra"]);
        assert!(parse_ext_registration(&payload).is_err());
    }

    #[test]
    fn test_rejects_non_string_name() {
        let payload = json!([42, {}]);
        let err = parse_ext_registration(&payload).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_extension_id_display() {
        let id = ExtensionId::from("risk-recorder");
        assert_eq!(id.to_string(), "risk-recorder");
    }
}
