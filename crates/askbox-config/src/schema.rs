// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde default helper: returns `true`.
///
/// `#[serde(default)]` on a `bool` falls back to `false`, so fields that are
/// enabled unless switched off need a named function.
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Placeholder printed instead of an explicit API key.
pub const REDACTED: &str = "<redacted>";

impl Config {
    /// Copy suitable for display: explicit API keys are masked.  Keys read
    /// from the environment never appear in the config and are unaffected.
    pub fn redacted(&self) -> Config {
        let mask = |key: &Option<String>| key.as_ref().map(|_| REDACTED.to_string());
        let mut shown = self.clone();
        shown.generation.api_key = mask(&self.generation.api_key);
        shown.search.api_key = mask(&self.search.api_key);
        shown
    }
}

// ─── Generation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// `"hosted"` talks to the inference API; `"echo"` answers offline by
    /// repeating the prompt.
    pub provider: String,
    /// Root of the inference API.  The model path is appended as
    /// `{base_url}/models/{model}`.
    pub base_url: String,
    /// Model identifier forwarded to the API
    pub model: String,
    /// Environment variable that holds the API token (read at runtime)
    pub api_key_env: Option<String>,
    /// Explicit API token; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    pub api_key: Option<String>,
    /// Maximum output length requested per completion
    pub max_length: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "hosted".into(),
            base_url: "https://api-inference.huggingface.co".into(),
            model: "gpt2".into(),
            api_key_env: Some("HF_API_TOKEN".into()),
            api_key: None,
            max_length: 150,
            timeout_secs: 30,
        }
    }
}

impl GenerationConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), self.api_key_env.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// When false, fallback answers are never augmented.
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub base_url: String,
    /// Search engine forwarded as the `engine` query parameter
    pub engine: String,
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://serpapi.com".into(),
            engine: "google".into(),
            api_key_env: Some("SERPAPI_API_KEY".into()),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), self.api_key_env.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─── Storage ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Name of the persisted snapshot entry
    pub namespace: String,
    /// Directory holding snapshot files.  `~` is expanded.  Defaults to
    /// `$XDG_DATA_HOME/askbox`.
    pub dir: Option<String>,
    /// Snapshots older than this are discarded on load
    pub ttl_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: "chatHistory".into(),
            dir: None,
            ttl_hours: 24,
        }
    }
}

impl StorageConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 60 * 60)
    }

    /// Resolve the snapshot directory, falling back to the platform data dir.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return PathBuf::from(shellexpand::tilde(dir).into_owned());
        }
        dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("askbox")
    }
}

// ─── Conversation ────────────────────────────────────────────────────────────

/// What to do when a fallback search succeeds but returns nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySearchPolicy {
    /// Append an `Error: no search results ...` message.
    #[default]
    Error,
    /// Finish the turn without an extra message.
    Silent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// The assistant message a fresh conversation starts with
    pub greeting: String,
    /// Case-insensitive substrings that mark an answer as a non-answer and
    /// trigger a web search
    pub fallback_markers: Vec<String>,
    pub on_empty_search: EmptySearchPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! How can I help you today?".into(),
            fallback_markers: vec!["I don't know".into(), "I can't help".into()],
            on_empty_search: EmptySearchPolicy::default(),
        }
    }
}

fn resolve_api_key(explicit: Option<&str>, env: Option<&str>) -> Option<String> {
    if let Some(k) = explicit {
        return Some(k.to_string());
    }
    env.and_then(|name| std::env::var(name).ok())
        .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_masks_explicit_keys_only() {
        let mut cfg = Config::default();
        cfg.generation.api_key = Some("hf_secret".into());
        cfg.search.api_key = Some("serp_secret".into());

        let shown = cfg.redacted();
        assert_eq!(shown.generation.api_key.as_deref(), Some(REDACTED));
        assert_eq!(shown.search.api_key.as_deref(), Some(REDACTED));
        assert_eq!(shown.generation.api_key_env, cfg.generation.api_key_env);
        assert_eq!(cfg.generation.api_key.as_deref(), Some("hf_secret"));

        let text = toml::to_string(&shown).unwrap();
        assert!(!text.contains("hf_secret"));
        assert!(!text.contains("serp_secret"));

        assert!(Config::default().redacted().search.api_key.is_none());
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.generation.max_length, 150);
        assert_eq!(cfg.storage.ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(cfg.storage.namespace, "chatHistory");
        assert_eq!(cfg.conversation.on_empty_search, EmptySearchPolicy::Error);
        assert_eq!(cfg.conversation.fallback_markers.len(), 2);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"[search]
engine = "bing""#,
        )
        .unwrap();
        assert_eq!(cfg.search.engine, "bing");
        assert!(cfg.search.enabled);
        assert_eq!(cfg.search.timeout_secs, 15);
    }

    #[test]
    fn empty_search_policy_parses_lowercase() {
        let cfg: Config = toml::from_str(
            r#"[conversation]
on_empty_search = "silent""#,
        )
        .unwrap();
        assert_eq!(cfg.conversation.on_empty_search, EmptySearchPolicy::Silent);
    }

    #[test]
    fn explicit_api_key_wins_over_env() {
        let cfg = GenerationConfig {
            api_key: Some("explicit".into()),
            api_key_env: Some("ASKBOX_TEST_UNUSED_ENV".into()),
            ..GenerationConfig::default()
        };
        assert_eq!(cfg.resolve_api_key().as_deref(), Some("explicit"));
    }

    #[test]
    fn storage_dir_override_is_used() {
        let cfg = StorageConfig { dir: Some("/tmp/askbox-x".into()), ..Default::default() };
        assert_eq!(cfg.data_dir(), PathBuf::from("/tmp/askbox-x"));
    }
}
