// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

use askbox_config::SearchConfig;
use askbox_model::{SearchResult, MAX_SEARCH_RESULTS};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{SearchAugmenter, SearchError, SearchOutcome};

/// The engine reports an empty result page as an `error` field with a 200.
const EMPTY_RESULTS_MARKER: &str = "hasn't returned any results";

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic_results: Vec<Value>,
}

#[derive(Deserialize)]
struct KnowledgeGraph {
    #[serde(default)]
    description: Option<String>,
}

/// Hosted search client speaking the SerpApi `search.json` format.
pub struct SerpApiSearch {
    client: reqwest::Client,
    endpoint: String,
    engine: String,
    /// Optional API key override (falls back to `search.api_key_env`)
    api_key: Option<String>,
    /// Variable named in the error when no key was found
    api_key_env: Option<String>,
}

impl SerpApiSearch {
    pub fn new(
        base_url: &str,
        engine: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("askbox/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/search.json", base_url.trim_end_matches('/')),
            engine: engine.into(),
            api_key,
            api_key_env: None,
        })
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self, SearchError> {
        let mut search =
            Self::new(&cfg.base_url, cfg.engine.clone(), cfg.resolve_api_key(), cfg.timeout())?;
        search.api_key_env = cfg.api_key_env.clone();
        Ok(search)
    }
}

#[async_trait]
impl SearchAugmenter for SerpApiSearch {
    async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let Some(api_key) = &self.api_key else {
            return Err(SearchError::MissingApiKey { env: self.api_key_env.clone() });
        };

        debug!(query = %query, engine = %self.engine, "web search");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("engine", self.engine.as_str()), ("api_key", api_key.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        let parsed: SerpResponse =
            serde_json::from_str(&text).map_err(|e| SearchError::Decode(e.to_string()))?;
        decode_outcome(parsed)
    }
}

fn decode_outcome(parsed: SerpResponse) -> Result<SearchOutcome, SearchError> {
    if let Some(err) = parsed.error {
        if err.contains(EMPTY_RESULTS_MARKER) {
            return Ok(SearchOutcome::default());
        }
        return Err(SearchError::Api(err));
    }

    let results = parsed
        .organic_results
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|item| {
            serde_json::from_value::<SearchResult>(item)
                .map_err(|e| SearchError::Decode(format!("result item: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let direct_answer = parsed
        .knowledge_graph
        .and_then(|kg| kg.description)
        .filter(|d| !d.trim().is_empty());

    Ok(SearchOutcome { direct_answer, results })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<SearchOutcome, SearchError> {
        decode_outcome(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn takes_first_three_results_in_order() {
        let out = parse(
            r#"{"organic_results":[
                {"title":"a","snippet":"sa","link":"https://a"},
                {"title":"b","snippet":"sb","link":"https://b"},
                {"title":"c","snippet":"sc","link":"https://c"},
                {"title":"d","snippet":"sd","link":"https://d"}
            ]}"#,
        )
        .unwrap();
        let titles: Vec<_> = out.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(out.direct_answer.is_none());
    }

    #[test]
    fn extracts_knowledge_graph_description() {
        let out = parse(
            r#"{"knowledge_graph":{"title":"Rust","description":"A language."},
                "organic_results":[]}"#,
        )
        .unwrap();
        assert_eq!(out.direct_answer.as_deref(), Some("A language."));
        assert!(out.results.is_empty());
    }

    #[test]
    fn item_without_link_fails_the_whole_search() {
        let err = parse(r#"{"organic_results":[{"title":"a","snippet":"s"}]}"#).unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn malformed_item_past_the_cap_is_ignored() {
        let out = parse(
            r#"{"organic_results":[
                {"title":"a","link":"https://a"},
                {"title":"b","link":"https://b"},
                {"title":"c","link":"https://c"},
                {"broken":true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(out.results.len(), 3);
    }

    #[test]
    fn empty_page_error_means_no_results() {
        let out = parse(r#"{"error":"Google hasn't returned any results for this query."}"#)
            .unwrap();
        assert_eq!(out, SearchOutcome::default());
    }

    #[test]
    fn other_api_errors_surface() {
        let err = parse(r#"{"error":"Invalid API key."}"#).unwrap_err();
        assert_eq!(err, SearchError::Api("Invalid API key.".into()));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let s = SerpApiSearch::new("http://127.0.0.1:9", "google", None, Duration::from_secs(1))
            .unwrap();
        assert_eq!(s.search("rust").await, Err(SearchError::MissingApiKey { env: None }));
    }

    #[tokio::test]
    async fn missing_key_error_names_the_configured_variable() {
        let cfg = SearchConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key_env: Some("ASKBOX_TEST_UNSET_SEARCH_KEY".into()),
            api_key: None,
            ..SearchConfig::default()
        };
        let err = SerpApiSearch::from_config(&cfg).unwrap().search("rust").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "no search API key configured; set ASKBOX_TEST_UNSET_SEARCH_KEY or search.api_key"
        );
        assert!(!err.to_string().contains("SERPAPI_API_KEY"));
    }
}
