// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Split a response into prose and fenced code blocks.
//!
//! A fence opens with three backticks, optionally followed by a language tag
//! that ends the line, and closes at the next three backticks.  An opener
//! without a matching closer is left as prose.

const FENCE: &str = "```";

/// Language reported for fences without a tag.
pub const DEFAULT_CODE_LANGUAGE: &str = "text";

/// One renderable piece of a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code { language: String, content: String },
}

impl Segment {
    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Code { language: language.into(), content: content.into() }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }
}

/// Decompose `text` into ordered [`Segment`]s.
///
/// Prose between fences is kept byte-for-byte; code bodies are trimmed.
/// Empty input yields an empty list.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut cursor = 0;

    while let Some(open_rel) = text[cursor..].find(FENCE) {
        let open = cursor + open_rel;
        let after_open = open + FENCE.len();
        let (language, body_offset) = parse_info_string(&text[after_open..]);
        let body_start = after_open + body_offset;

        let Some(close_rel) = text[body_start..].find(FENCE) else {
            break;
        };
        let close = body_start + close_rel;

        if open > cursor {
            out.push(Segment::Text(text[cursor..open].to_string()));
        }
        out.push(Segment::Code {
            language: language.unwrap_or(DEFAULT_CODE_LANGUAGE).to_string(),
            content: text[body_start..close].trim().to_string(),
        });
        cursor = close + FENCE.len();
    }

    if cursor < text.len() {
        out.push(Segment::Text(text[cursor..].to_string()));
    }
    out
}

/// Read an optional language tag right after the opening fence.
///
/// The tag only counts when word characters are followed by the end of the
/// line; returns the tag and the offset at which the body starts.
fn parse_info_string(after_open: &str) -> (Option<&str>, usize) {
    let tag_len = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(after_open.len());
    let tag = &after_open[..tag_len];

    let rest = &after_open[tag_len..];
    let pad = rest.len() - rest.trim_start_matches([' ', '\t', '\r']).len();
    if rest[pad..].starts_with('\n') {
        let language = (!tag.is_empty()).then_some(tag);
        (language, tag_len + pad + 1)
    } else {
        (None, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.into())
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn prose_without_fences_is_one_text_segment() {
        for input in ["hello", "  spaced  ", "line one\nline two", "a `tick` or ``two``"] {
            assert_eq!(segment(input), vec![text(input)], "input: {input:?}");
        }
    }

    #[test]
    fn fence_between_prose() {
        assert_eq!(
            segment("a ```js\ncode\n``` b"),
            vec![text("a "), Segment::code("js", "code"), text(" b")]
        );
    }

    #[test]
    fn untagged_fence_defaults_to_text_language() {
        assert_eq!(
            segment("```\nplain\n```"),
            vec![Segment::code(DEFAULT_CODE_LANGUAGE, "plain")]
        );
    }

    #[test]
    fn code_body_is_trimmed_but_inner_lines_kept() {
        let segs = segment("```python\n\n  def f():\n      pass\n\n```");
        assert_eq!(segs, vec![Segment::code("python", "def f():\n      pass")]);
    }

    #[test]
    fn multiple_fences_keep_order() {
        let segs = segment("one\n```rust\nfn a() {}\n```\ntwo\n```sh\nls\n```");
        assert_eq!(
            segs,
            vec![
                text("one\n"),
                Segment::code("rust", "fn a() {}"),
                text("\ntwo\n"),
                Segment::code("sh", "ls"),
            ]
        );
    }

    #[test]
    fn adjacent_fences_emit_no_empty_text() {
        let segs = segment("```a\n1\n``````b\n2\n```");
        assert_eq!(segs, vec![Segment::code("a", "1"), Segment::code("b", "2")]);
    }

    #[test]
    fn unclosed_fence_stays_prose() {
        let input = "before ```rust\nfn never_closed() {}";
        assert_eq!(segment(input), vec![text(input)]);
    }

    #[test]
    fn unclosed_fence_after_a_closed_one() {
        let segs = segment("```\nx\n``` tail ```y");
        assert_eq!(segs, vec![Segment::code("text", "x"), text(" tail ```y")]);
    }

    #[test]
    fn tag_without_newline_is_part_of_the_body() {
        assert_eq!(
            segment("```hello world```"),
            vec![Segment::code(DEFAULT_CODE_LANGUAGE, "hello world")]
        );
    }

    #[test]
    fn crlf_after_tag_is_accepted() {
        assert_eq!(segment("```js\r\nx\r\n```"), vec![Segment::code("js", "x")]);
    }

    #[test]
    fn non_ascii_prose_survives_slicing() {
        let segs = segment("héllo ```\nçode\n``` wörld");
        assert_eq!(segs, vec![text("héllo "), Segment::code("text", "çode"), text(" wörld")]);
    }

    #[test]
    fn segmentation_is_restartable() {
        let input = "x ```js\n1\n``` y";
        assert_eq!(segment(input), segment(input));
    }
}
