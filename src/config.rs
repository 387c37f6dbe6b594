//! Store configuration
//!
//! One endpoint/credential pair for the remote store plus the test-mode
//! switch, resolved once at process start. The concrete remote client is
//! built from this by the embedder; the store core itself only consumes
//! the test-mode fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for one store instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Remote store endpoint (default: "http://localhost:8000")
    #[serde(default = "default_url")]
    pub url: String,

    /// Remote store credential (default: empty)
    #[serde(default)]
    pub api_key: String,

    /// Whether the test-mode guard suppresses non-sandbox writes
    #[serde(default)]
    pub test_mode: bool,

    /// Guild id of the sandbox record writes may still target in test mode
    #[serde(default = "default_sandbox_id")]
    pub sandbox_id: i64,
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_sandbox_id() -> i64 {
    0
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            test_mode: false,
            sandbox_id: default_sandbox_id(),
        }
    }
}

impl StoreConfig {
    /// Resolve configuration from the environment
    ///
    /// Reads `GUILDSTORE_URL`, `GUILDSTORE_KEY`, `GUILDSTORE_TEST_MODE`
    /// ("1" or "true"), and `GUILDSTORE_SANDBOX_ID`; anything unset keeps
    /// its default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("GUILDSTORE_URL") {
            config.url = url;
        }
        if let Ok(key) = std::env::var("GUILDSTORE_KEY") {
            config.api_key = key;
        }
        if let Ok(flag) = std::env::var("GUILDSTORE_TEST_MODE") {
            config.test_mode = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
        if let Ok(id) = std::env::var("GUILDSTORE_SANDBOX_ID") {
            if let Ok(id) = id.parse() {
                config.sandbox_id = id;
            }
        }
        config
    }

    /// Sandbox id as a primary-key value
    pub fn sandbox_key(&self) -> Value {
        Value::from(self.sandbox_id)
    }
}
