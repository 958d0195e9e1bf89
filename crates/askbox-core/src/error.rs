// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use askbox_model::{Message, ResponderError};
use askbox_search::SearchError;
use thiserror::Error;

/// Anything that can go wrong while answering one submission.
///
/// Never propagated past the controller: each failure becomes exactly one
/// assistant message via [`TurnError::to_message`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error(transparent)]
    Responder(#[from] ResponderError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("no search results for \"{query}\"")]
    NoResults { query: String },
}

impl TurnError {
    pub fn to_message(&self) -> Message {
        Message::assistant(format!("Error: {self}"))
    }
}
