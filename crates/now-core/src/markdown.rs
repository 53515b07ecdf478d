//! Inline markup for task descriptions.
//!
//! Supported runs:
//! - `**bold**`
//! - `*emphasis*`
//! - `##highlight#` (two hashes open, one hash closes)
//!
//! An unterminated run extends to the end of the text. Due markers
//! (`@due:...`) are dropped from the visible output.

use serde::Serialize;

use crate::due::DUE_MARKER;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub style: SpanStyle,
    pub text: String,
}

impl Span {
    pub fn new(style: SpanStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

pub fn render(description: &str) -> Vec<Span> {
    let chars: Vec<char> = description.chars().collect();
    let marker: Vec<char> = DUE_MARKER.chars().collect();
    let mut spans: Vec<Span> = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '*' && next == Some('*') {
            flush_plain(&mut spans, &mut plain);
            let (text, end) = take_until(&chars, i + 2, &['*', '*']);
            push_span(&mut spans, SpanStyle::Bold, text);
            i = end;
        } else if c == '*' {
            flush_plain(&mut spans, &mut plain);
            let (text, end) = take_until(&chars, i + 1, &['*']);
            push_span(&mut spans, SpanStyle::Italic, text);
            i = end;
        } else if c == '#' && next == Some('#') {
            flush_plain(&mut spans, &mut plain);
            let (text, end) = take_until(&chars, i + 2, &['#']);
            push_span(&mut spans, SpanStyle::Highlight, text);
            i = end;
        } else if chars[i..].starts_with(&marker) {
            let after_space = i > 0 && chars[i - 1] == ' ';
            if after_space && plain.ends_with(' ') {
                plain.pop();
            }
            let mut j = i + marker.len();
            while j < chars.len() && !chars[j].is_whitespace() {
                j += 1;
            }
            // No preceding space was removed, so remove the whitespace after the marker.
            if !after_space && j < chars.len() {
                j += 1;
            }
            i = j;
        } else {
            plain.push(c);
            i += 1;
        }
    }
    flush_plain(&mut spans, &mut plain);
    spans
}

/// Visible text with markup and due markers removed.
pub fn plain_text(description: &str) -> String {
    render(description)
        .into_iter()
        .map(|span| span.text)
        .collect()
}

fn take_until(chars: &[char], start: usize, delim: &[char]) -> (String, usize) {
    let start = start.min(chars.len());
    let mut idx = start;
    while idx < chars.len() {
        if chars[idx..].starts_with(delim) {
            let text: String = chars[start..idx].iter().collect();
            return (text, idx + delim.len());
        }
        idx += 1;
    }
    (chars[start..].iter().collect(), chars.len())
}

fn flush_plain(spans: &mut Vec<Span>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(Span::new(SpanStyle::Plain, std::mem::take(plain)));
    }
}

fn push_span(spans: &mut Vec<Span>, style: SpanStyle, text: String) {
    if !text.is_empty() {
        spans.push(Span::new(style, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_bold_italic_and_highlight_runs() {
        assert_eq!(
            render("**bold** and *italic* and ##hi#"),
            vec![
                Span::new(SpanStyle::Bold, "bold"),
                Span::new(SpanStyle::Plain, " and "),
                Span::new(SpanStyle::Italic, "italic"),
                Span::new(SpanStyle::Plain, " and "),
                Span::new(SpanStyle::Highlight, "hi"),
            ]
        );
    }

    #[test]
    fn highlight_closes_on_single_hash() {
        assert_eq!(
            render("##urgent# call"),
            vec![
                Span::new(SpanStyle::Highlight, "urgent"),
                Span::new(SpanStyle::Plain, " call"),
            ]
        );
    }

    #[test]
    fn single_hash_is_plain_text() {
        assert_eq!(
            render("issue #42"),
            vec![Span::new(SpanStyle::Plain, "issue #42")]
        );
    }

    #[test]
    fn unterminated_runs_extend_to_end() {
        assert_eq!(
            render("a **never closed"),
            vec![
                Span::new(SpanStyle::Plain, "a "),
                Span::new(SpanStyle::Bold, "never closed"),
            ]
        );
        assert_eq!(
            render("*open"),
            vec![Span::new(SpanStyle::Italic, "open")]
        );
        assert_eq!(
            render("##glow"),
            vec![Span::new(SpanStyle::Highlight, "glow")]
        );
    }

    #[test]
    fn due_marker_and_preceding_space_are_hidden() {
        assert_eq!(plain_text("buy milk @due:2025-03-10"), "buy milk");
        assert_eq!(
            plain_text("buy milk @due:2025-03-10 today"),
            "buy milk today"
        );
    }

    #[test]
    fn leading_due_marker_drops_following_space() {
        assert_eq!(plain_text("@due:2025-03-10 buy milk"), "buy milk");
    }

    #[test]
    fn marker_glued_to_a_word_drops_following_space() {
        assert_eq!(plain_text("call@due:2026-11-02 about"), "callabout");
    }

    #[test]
    fn due_marker_is_not_revalidated() {
        assert_eq!(plain_text("ship it @due:whenever"), "ship it");
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(
            plain_text("**Read** *chapter* ##three# @due:2030-01-01"),
            "Read chapter three"
        );
    }

    #[test]
    fn empty_description_renders_nothing() {
        assert!(render("").is_empty());
    }
}
