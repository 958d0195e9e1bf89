// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{Responder, ResponderError};

/// Offline responder.  Echoes the prompt back as the completion.
#[derive(Default)]
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ResponderError> {
        Ok(format!("ECHO: {}", prompt.trim()))
    }
}

/// A pre-scripted responder.  Each call to `complete` pops the next outcome
/// from the front of the queue, so tests can specify exact replies and
/// failures without network access.
#[derive(Clone)]
pub struct ScriptedResponder {
    scripts: Arc<Mutex<VecDeque<Result<String, ResponderError>>>>,
    /// Every prompt seen by this responder, in call order.
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedResponder {
    pub fn new(scripts: Vec<Result<String, ResponderError>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: responder that returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![Ok(reply.into())])
    }

    /// Convenience: responder whose first call fails with `err`.
    pub fn failing(err: ResponderError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ResponderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("[no more scripts]".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_repeats_trimmed_prompt() {
        let out = EchoResponder.complete("  hi  ").await.unwrap();
        assert_eq!(out, "ECHO: hi");
    }

    #[tokio::test]
    async fn scripted_pops_in_order_and_records_prompts() {
        let r = ScriptedResponder::new(vec![Ok("one".into()), Err(ResponderError::Status(503))]);
        assert_eq!(r.complete("a").await, Ok("one".into()));
        assert_eq!(r.complete("b").await, Err(ResponderError::Status(503)));
        assert_eq!(r.complete("c").await, Ok("[no more scripts]".into()));
        assert_eq!(*r.prompts.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(r.calls(), 3);
    }
}
