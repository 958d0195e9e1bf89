// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Web search used to back up answers the model could not give.

mod serpapi;
mod scripted;

pub use serpapi::SerpApiSearch;
pub use scripted::ScriptedSearch;

use askbox_model::SearchResult;
use async_trait::async_trait;
use thiserror::Error;

/// What a successful search produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Knowledge-graph style one-line answer, when the engine has one.
    pub direct_answer: Option<String>,
    /// At most [`askbox_model::MAX_SEARCH_RESULTS`] hits in engine order.
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search API returned status {0}")]
    Status(u16),

    #[error("search request failed: {0}")]
    Transport(String),

    #[error("could not decode search response: {0}")]
    Decode(String),

    #[error("search API error: {0}")]
    Api(String),

    /// `env` is the variable the key would have been read from, if any.
    #[error("no search API key configured; set {} or search.api_key", key_source(.env))]
    MissingApiKey { env: Option<String> },
}

fn key_source(env: &Option<String>) -> &str {
    env.as_deref().unwrap_or("search.api_key_env")
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SearchError::Decode(e.to_string())
        } else {
            SearchError::Transport(e.to_string())
        }
    }
}

#[async_trait]
pub trait SearchAugmenter: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError>;
}
