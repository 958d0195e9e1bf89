// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Text decomposition for rendering: fenced code blocks and inline markup.

pub mod segment;
pub mod inline;

pub use segment::{segment, Segment, DEFAULT_CODE_LANGUAGE};
pub use inline::{spans, Span};
