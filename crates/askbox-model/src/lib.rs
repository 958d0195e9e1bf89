// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
mod types;
mod responder;
mod hosted;
mod mock;

pub use types::*;
pub use responder::{Responder, ResponderError};
pub use hosted::HostedResponder;
pub use mock::{EchoResponder, ScriptedResponder};

use anyhow::bail;
use askbox_config::GenerationConfig;

/// Construct a boxed [`Responder`] from configuration.
///
/// Provider selection:
/// - `"hosted"` → [`HostedResponder`]
/// - `"echo"` → [`EchoResponder`] (offline, repeats the prompt)
pub fn from_config(cfg: &GenerationConfig) -> anyhow::Result<Box<dyn Responder>> {
    match cfg.provider.as_str() {
        "hosted" => Ok(Box::new(HostedResponder::from_config(cfg)?)),
        "echo" => Ok(Box::new(EchoResponder)),
        other => bail!("unknown generation provider: {other}"),
    }
}
