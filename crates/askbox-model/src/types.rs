// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of search results attached to one message.
pub const MAX_SEARCH_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One web search hit, carried verbatim from the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    pub link: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self { title: title.into(), snippet: snippet.into(), link: link.into() }
    }
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// A single entry in the conversation log.
///
/// Serialises with camelCase keys and the creation time as epoch
/// milliseconds under `timestamp`, which is the persisted snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
    #[serde(default)]
    pub time_display_expanded: bool,
}

impl Message {
    /// Build a message stamped at `at`, truncated to millisecond precision.
    pub fn at(role: Role, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: truncate_to_millis(at),
            search_results: None,
            time_display_expanded: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::at(Role::User, text, Utc::now())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::at(Role::Assistant, text, Utc::now())
    }

    /// Attach search results, keeping at most [`MAX_SEARCH_RESULTS`].
    pub fn with_results(mut self, mut results: Vec<SearchResult>) -> Self {
        results.truncate(MAX_SEARCH_RESULTS);
        self.search_results = Some(results);
        self
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn results(&self) -> &[SearchResult] {
        self.search_results.as_deref().unwrap_or(&[])
    }

    /// Short (`14:03`) or fully expanded (`Sat, Oct 18 2026 14:03:22`)
    /// local time, depending on `time_display_expanded`.
    pub fn time_label(&self) -> String {
        let local = self.created_at.with_timezone(&Local);
        if self.time_display_expanded {
            local.format("%a, %b %-d %Y %H:%M:%S").to_string()
        } else {
            local.format("%H:%M").to_string()
        }
    }
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn created_at_is_millisecond_precise() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let msg = Message::at(Role::User, "hi", at);
        assert_eq!(msg.created_at().timestamp_millis(), at.timestamp_millis());
        assert_eq!(msg.created_at().timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn serialises_timestamp_as_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let msg = Message::at(Role::Assistant, "hello", at);
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["timestamp"], 1_700_000_000_123_i64);
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["timeDisplayExpanded"], false);
        assert!(v.get("searchResults").is_none());
    }

    #[test]
    fn with_results_caps_at_three() {
        let results = (0..5)
            .map(|i| SearchResult::new(format!("t{i}"), "s", format!("https://e/{i}")))
            .collect();
        let msg = Message::assistant("caption").with_results(results);
        assert_eq!(msg.results().len(), MAX_SEARCH_RESULTS);
        assert_eq!(msg.results()[2].title, "t2");
    }

    #[test]
    fn deserialises_missing_snippet_as_empty() {
        let r: SearchResult =
            serde_json::from_str(r#"{"title":"T","link":"https://x"}"#).unwrap();
        assert_eq!(r.snippet, "");
    }

    #[test]
    fn time_label_switches_between_short_and_expanded() {
        let mut msg = Message::user("x");
        let short = msg.time_label();
        assert_eq!(short.len(), 5);
        assert!(short.contains(':'));
        msg.time_display_expanded = true;
        let long = msg.time_label();
        assert!(long.len() > short.len());
        assert!(long.contains(&short));
    }
}
