// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Limited inline markup inside prose: `**strong**` and `` `code` ``.
//! Markers without a partner are plain text.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Strong(String),
    Code(String),
}

pub fn spans(text: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        let marked = delimited(rest, "**", Span::Strong).or_else(|| delimited(rest, "`", Span::Code));
        if let Some((span, consumed)) = marked {
            flush_plain(&mut plain, &mut out);
            out.push(span);
            i += consumed;
            continue;
        }
        let Some(ch) = rest.chars().next() else { break };
        plain.push(ch);
        i += ch.len_utf8();
    }

    flush_plain(&mut plain, &mut out);
    out
}

/// Match `marker inner marker` at the start of `rest`; returns the span and
/// the number of bytes consumed.  Empty inner text is not a match.
fn delimited(rest: &str, marker: &str, make: fn(String) -> Span) -> Option<(Span, usize)> {
    let inner = rest.strip_prefix(marker)?;
    let end = inner.find(marker)?;
    if end == 0 {
        return None;
    }
    Some((make(inner[..end].to_string()), end + 2 * marker.len()))
}

fn flush_plain(plain: &mut String, out: &mut Vec<Span>) {
    if !plain.is_empty() {
        out.push(Span::Plain(std::mem::take(plain)));
    }
}
