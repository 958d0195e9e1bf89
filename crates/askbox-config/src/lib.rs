// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
mod schema;
mod loader;

pub use schema::*;
pub use loader::{load, load_layers, LoadedConfig};
