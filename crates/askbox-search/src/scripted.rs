// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use askbox_model::SearchResult;
use async_trait::async_trait;

use crate::{SearchAugmenter, SearchError, SearchOutcome};

/// Deterministic search double.  Each call pops the next scripted outcome;
/// once the queue is empty every call returns an empty outcome.
#[derive(Clone, Default)]
pub struct ScriptedSearch {
    scripts: Arc<Mutex<VecDeque<Result<SearchOutcome, SearchError>>>>,
    /// Every query seen, in call order.
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSearch {
    pub fn new(scripts: Vec<Result<SearchOutcome, SearchError>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: one successful search with the given answer and hits.
    pub fn returning(direct_answer: Option<&str>, results: Vec<SearchResult>) -> Self {
        Self::new(vec![Ok(SearchOutcome {
            direct_answer: direct_answer.map(str::to_string),
            results,
        })])
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchAugmenter for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchOutcome::default()))
    }
}
