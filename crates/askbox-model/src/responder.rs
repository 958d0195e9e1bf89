// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("generation API returned status {0}")]
    Status(u16),

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("could not decode generation response: {0}")]
    Decode(String),

    #[error("generation API returned no completions")]
    Empty,
}

impl From<reqwest::Error> for ResponderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ResponderError::Decode(e.to_string())
        } else {
            ResponderError::Transport(e.to_string())
        }
    }
}

/// A text-generation backend that turns a prompt into a single completion.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Short provider name for logs and status display.
    fn name(&self) -> &str;

    /// Send `prompt` and return the first completion, trimmed.
    async fn complete(&self, prompt: &str) -> Result<String, ResponderError>;
}
