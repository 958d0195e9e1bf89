// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Hosted inference driver.
//!
//! Wire format: `POST {base_url}/models/{model}` with
//! `{"inputs": "...", "parameters": {"max_length": N}}`; the response is a
//! JSON array of `{"generated_text": "..."}` objects.

use std::time::Duration;

use askbox_config::GenerationConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Responder, ResponderError};

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_length: u32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

pub struct HostedResponder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_length: u32,
}

impl HostedResponder {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        max_length: u32,
        timeout: Duration,
    ) -> Result<Self, ResponderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("askbox/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/models/{}", base_url.trim_end_matches('/'), model),
            api_key,
            max_length,
        })
    }

    pub fn from_config(cfg: &GenerationConfig) -> Result<Self, ResponderError> {
        Self::new(
            &cfg.base_url,
            &cfg.model,
            cfg.resolve_api_key(),
            cfg.max_length,
            cfg.timeout(),
        )
    }
}

#[async_trait]
impl Responder for HostedResponder {
    fn name(&self) -> &str {
        "hosted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ResponderError> {
        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "generation request");

        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters { max_length: self.max_length },
        };
        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ResponderError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        let completions: Vec<GeneratedText> = serde_json::from_str(&text)
            .map_err(|e| ResponderError::Decode(e.to_string()))?;

        completions
            .into_iter()
            .next()
            .map(|c| c.generated_text.trim().to_string())
            .ok_or(ResponderError::Empty)
    }
}
