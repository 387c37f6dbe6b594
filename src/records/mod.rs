//! Persisted record types
//!
//! One typed record per settings domain plus the data tables. Settings
//! records are defaultable: every non-key field has a declared default,
//! so reads synthesize a usable value before the row exists, and their
//! reads are served cache-first. Data records have no sensible default;
//! absence is a normal empty option.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Column, DefaultRecord, Record, SchemaError, SchemaRegistry};

/// Per-guild talkback behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkbackSettings {
    /// Guild this row belongs to
    pub server_id: i64,
    /// Whether talkback responses fire at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds before a response is deleted; 0 keeps it permanent
    #[serde(default)]
    pub duration: i64,
    /// Exact-match triggers only, instead of substring matches
    #[serde(default)]
    pub strict: bool,
    /// Percent chance of responding to a matched trigger
    #[serde(default = "default_res_probability")]
    pub res_probability: i64,
    /// Percent chance of answering with a generated response instead
    #[serde(default = "default_ai_probability")]
    pub ai_probability: i64,
}

fn default_enabled() -> bool {
    true
}

fn default_res_probability() -> i64 {
    100
}

fn default_ai_probability() -> i64 {
    5
}

impl Default for TalkbackSettings {
    fn default() -> Self {
        Self {
            server_id: 0,
            enabled: default_enabled(),
            duration: 0,
            strict: false,
            res_probability: default_res_probability(),
            ai_probability: default_ai_probability(),
        }
    }
}

impl Record for TalkbackSettings {
    const TABLE: &'static str = "TalkbackSettings";
    const COLUMNS: &'static [Column] = &[
        Column::primary_key("server_id"),
        Column::new("enabled"),
        Column::new("duration"),
        Column::new("strict"),
        Column::new("res_probability"),
        Column::new("ai_probability"),
    ];
    const CACHE_READS: bool = true;

    fn primary_key_value(&self) -> Value {
        Value::from(self.server_id)
    }
}

impl DefaultRecord for TalkbackSettings {}

/// Per-guild music playback tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSettings {
    /// Guild this row belongs to
    pub server_id: i64,
    /// Whether the current queue loops
    #[serde(default)]
    pub looped: bool,
    /// Playback speed in percent, 100 through 200
    #[serde(default = "default_hundred")]
    pub speed: i64,
    /// Base volume in percent, 0 through 100
    #[serde(default = "default_hundred")]
    pub volume: i64,
    /// Pitch in percent of the original
    #[serde(default = "default_hundred")]
    pub pitch: i64,
}

fn default_hundred() -> i64 {
    100
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            server_id: 0,
            looped: false,
            speed: default_hundred(),
            volume: default_hundred(),
            pitch: default_hundred(),
        }
    }
}

impl Record for MusicSettings {
    const TABLE: &'static str = "MusicSettings";
    const COLUMNS: &'static [Column] = &[
        Column::primary_key("server_id"),
        Column::new("looped"),
        Column::new("speed"),
        Column::new("volume"),
        Column::new("pitch"),
    ];
    const CACHE_READS: bool = true;

    fn primary_key_value(&self) -> Value {
        Value::from(self.server_id)
    }
}

impl DefaultRecord for MusicSettings {}

/// Per-guild text-generation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateSettings {
    /// Guild this row belongs to
    pub server_id: i64,
    /// Model used when a command names none
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_model() -> String {
    "openai".to_string()
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            server_id: 0,
            default_model: default_model(),
        }
    }
}

impl Record for GenerateSettings {
    const TABLE: &'static str = "GenerateSettings";
    const COLUMNS: &'static [Column] = &[
        Column::primary_key("server_id"),
        Column::new("default_model"),
    ];
    const CACHE_READS: bool = true;

    fn primary_key_value(&self) -> Value {
        Value::from(self.server_id)
    }
}

impl DefaultRecord for GenerateSettings {}

/// One saved quote
///
/// `id` is assigned by the remote store; a fresh quote carries `None` and
/// the column never appears in its insert payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Guild this quote belongs to
    pub server_id: i64,
    /// Unique lookup tag within the guild
    pub tag: String,
    /// Quote text, possibly with replaceable portions
    pub quote: String,
    /// Fallback text shown when no replacements are given
    pub default: String,
    /// Who said it; "None" when unattributed
    pub name: String,
    /// Whether the quote has replaceable portions
    pub replaceable: bool,
    /// Whether a fallback text was provided
    pub has_original: bool,
}

impl Record for Quote {
    const TABLE: &'static str = "Quotes";
    const COLUMNS: &'static [Column] = &[
        Column::new("id"),
        Column::new("server_id"),
        Column::new("tag"),
        Column::new("quote"),
        Column::new("default"),
        Column::new("name"),
        Column::new("replaceable"),
        Column::new("has_original"),
    ];

    fn primary_key_value(&self) -> Value {
        Value::from(self.id)
    }
}

/// One user's message-of-the-day line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motd {
    /// User this line belongs to
    pub user_id: i64,
    /// The line itself; empty means cleared
    pub motd: String,
}

impl Record for Motd {
    const TABLE: &'static str = "Motd";
    const COLUMNS: &'static [Column] =
        &[Column::primary_key("user_id"), Column::new("motd")];

    fn primary_key_value(&self) -> Value {
        Value::from(self.user_id)
    }
}

/// One trigger/response combo for talkbacks
///
/// Replaces the legacy parallel trigger and response arrays: one row per
/// combo, with its trigger set and response set side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talkback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Guild this combo belongs to
    pub server_id: i64,
    /// Phrases that set the combo off
    pub triggers: Vec<String>,
    /// Phrases the bot may answer with
    pub responses: Vec<String>,
}

impl Record for Talkback {
    const TABLE: &'static str = "Talkbacks";
    const COLUMNS: &'static [Column] = &[
        Column::new("id"),
        Column::new("server_id"),
        Column::new("triggers"),
        Column::new("responses"),
    ];

    fn primary_key_value(&self) -> Value {
        Value::from(self.id)
    }
}

/// Registry with every built-in record type registered
pub fn builtin_registry() -> Result<SchemaRegistry, SchemaError> {
    let mut registry = SchemaRegistry::new();
    registry.register::<TalkbackSettings>()?;
    registry.register::<MusicSettings>()?;
    registry.register::<GenerateSettings>()?;
    registry.register::<Quote>()?;
    registry.register::<Motd>()?;
    registry.register::<Talkback>()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use serde_json::json;

    #[test]
    fn test_builtin_registry_registers_all_tables() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.descriptor::<Quote>().primary_key, "id");
        assert_eq!(registry.descriptor::<Motd>().primary_key, "user_id");
        assert!(registry.descriptor::<TalkbackSettings>().cache_reads);
        assert!(!registry.descriptor::<Quote>().cache_reads);
    }

    #[test]
    fn test_talkback_settings_defaults() {
        let settings = TalkbackSettings::for_key(&json!(77)).unwrap();
        assert_eq!(settings.server_id, 77);
        assert!(settings.enabled);
        assert_eq!(settings.duration, 0);
        assert!(!settings.strict);
        assert_eq!(settings.res_probability, 100);
        assert_eq!(settings.ai_probability, 5);
    }

    #[test]
    fn test_music_settings_defaults() {
        let settings = MusicSettings::for_key(&json!(77)).unwrap();
        assert!(!settings.looped);
        assert_eq!(settings.speed, 100);
        assert_eq!(settings.volume, 100);
        assert_eq!(settings.pitch, 100);
    }

    #[test]
    fn test_fresh_quote_encodes_without_id() {
        let quote = Quote {
            id: None,
            server_id: 1,
            tag: "greeting".to_string(),
            quote: "hello {0}".to_string(),
            default: "hello there".to_string(),
            name: "None".to_string(),
            replaceable: true,
            has_original: true,
        };
        let fields = codec::encode(Quote::TABLE, &quote).unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["tag"], json!("greeting"));
    }

    #[test]
    fn test_sparse_settings_row_decodes_with_defaults() {
        let fields = match json!({"server_id": 3, "duration": 30}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let settings: TalkbackSettings =
            codec::decode(TalkbackSettings::TABLE, fields).unwrap();
        assert_eq!(settings.duration, 30);
        assert!(settings.enabled);
        assert_eq!(settings.res_probability, 100);
    }
}
