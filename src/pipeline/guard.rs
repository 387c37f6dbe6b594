//! Test-mode write suppression

use serde_json::Value;

/// Predicate deciding whether a write may reach the remote store
///
/// While test mode is active, every write whose primary-key value differs
/// from the designated sandbox key is suppressed and resolved as a
/// successful no-op. This lets the whole command surface run against a
/// live backend during integration testing without mutating real data;
/// the sandbox record is the single exception channel for tests that
/// intentionally write.
#[derive(Debug, Clone)]
pub struct TestModeGuard {
    enabled: bool,
    sandbox_key: Value,
}

impl TestModeGuard {
    /// Guard that lets every write through (production mode)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sandbox_key: Value::Null,
        }
    }

    /// Guard that suppresses every write except those targeting `sandbox_key`
    pub fn sandbox(sandbox_key: impl Into<Value>) -> Self {
        Self {
            enabled: true,
            sandbox_key: sandbox_key.into(),
        }
    }

    /// Whether test mode is active
    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// True when a write keyed by `key` may reach the remote store
    pub fn allows(&self, key: &Value) -> bool {
        !self.enabled || *key == self.sandbox_key
    }
}
