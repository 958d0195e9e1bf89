// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Terminal rendering of conversation messages.
//!
//! Prose is split into fenced code blocks and text by `askbox_input`; text is
//! further broken into inline spans.  Styling goes through crossterm so it
//! degrades to plain text when colour is disabled (`NO_COLOR`).

use std::fmt::Write as _;

use askbox_input::{segment, spans, Segment, Span};
use askbox_model::{Message, Role, SearchResult};
use crossterm::style::Stylize;

const CODE_INDENT: &str = "    ";

/// Render one message, header line included.  `index` is the position in the
/// log, shown so `/time N` can refer to it.
pub fn message(msg: &Message, index: usize) -> String {
    let mut out = String::new();
    let who = match msg.role {
        Role::User => "You".bold().cyan(),
        Role::Assistant => "Assistant".bold().green(),
    };
    let _ = writeln!(out, "{} {} {}", format!("[{index}]").dark_grey(), who, msg.time_label().dark_grey());
    out.push_str(&body(&msg.content));
    for (n, hit) in msg.results().iter().enumerate() {
        out.push_str(&search_result(n + 1, hit));
    }
    out
}

/// Render message text: fenced blocks labelled with their language, inline
/// markup styled.
pub fn body(content: &str) -> String {
    let mut out = String::new();
    for seg in segment(content) {
        match seg {
            Segment::Text(text) => {
                let text = text.trim_matches('\n');
                if text.is_empty() {
                    continue;
                }
                for line in text.lines() {
                    out.push_str(&inline(line));
                    out.push('\n');
                }
            }
            Segment::Code { language, content } => {
                let _ = writeln!(out, "{}", format!("┌─ {language}").dark_grey());
                for line in content.lines() {
                    let _ = writeln!(out, "{CODE_INDENT}{}", line.yellow());
                }
                let _ = writeln!(out, "{}", "└─".dark_grey());
            }
        }
    }
    out
}

fn inline(line: &str) -> String {
    spans(line)
        .into_iter()
        .map(|span| match span {
            Span::Plain(t) => t,
            Span::Strong(t) => t.bold().to_string(),
            Span::Code(t) => t.magenta().to_string(),
        })
        .collect()
}

fn search_result(n: usize, hit: &SearchResult) -> String {
    let mut out = format!("  {n}. {}\n", hit.title.as_str().bold());
    if !hit.snippet.is_empty() {
        let _ = writeln!(out, "     {}", hit.snippet);
    }
    let _ = writeln!(out, "     {}", hit.link.as_str().underlined().blue());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_block_is_labelled_with_language() {
        let out = body("Try this:\n```rust\nfn main() {}\n```\nDone.");
        assert!(out.contains("Try this:"));
        assert!(out.contains("rust"));
        assert!(out.contains("fn main() {}"));
        assert!(out.contains("Done."));
        assert!(!out.contains("```"));
    }

    #[test]
    fn unlabelled_block_uses_default_language() {
        let out = body("```\nplain\n```");
        assert!(out.contains(askbox_input::DEFAULT_CODE_LANGUAGE));
        assert!(out.contains("plain"));
    }

    #[test]
    fn inline_markers_are_consumed() {
        let out = body("use **bold** and `tick`");
        assert!(out.contains("bold"));
        assert!(out.contains("tick"));
        assert!(!out.contains("**"));
        assert!(!out.contains('`'));
    }

    #[test]
    fn message_lists_search_results() {
        let msg = Message::assistant("Here are results").with_results(vec![
            SearchResult::new("Rust", "A language", "https://rust-lang.org"),
            SearchResult::new("Tokio", "", "https://tokio.rs"),
        ]);
        let out = message(&msg, 3);
        assert!(out.contains("[3]"));
        assert!(out.contains("Assistant"));
        assert!(out.contains("1. "));
        assert!(out.contains("A language"));
        assert!(out.contains("https://rust-lang.org"));
        assert!(out.contains("2. "));
        assert!(out.contains("https://tokio.rs"));
    }
}
