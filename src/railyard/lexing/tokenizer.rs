//! Separator splitting
//!
//!     The tokenizer cuts a raw chunk into spans at separator markers. Separators are applied
//!     one after the other in the order they were added. Each separator keeps splitting the
//!     not yet classified spans until none of them contains its marker any more; spans that
//!     already are separators are left alone. That order is the precedence rule: with `::`
//!     added before `:`, the text `a::b` yields three spans, with `:` first it yields four.
//!
//!     When literals are in use, a final pass demotes separators that sit inside a quoted
//!     literal, detected by an odd number of unescaped delimiters on both sides, and merges
//!     the text spans around them back together.

use tracing::trace;

use crate::railyard::token::types::{LITERAL_DELIMITERS, LITERAL_ESCAPE};
use crate::railyard::token::TokenTypeRef;

/// A piece of a chunk, either plain text or a separator occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub separator: Option<TokenTypeRef>,
}

impl Span {
    pub fn text(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            separator: None,
        }
    }

    pub fn separator(text: impl Into<String>, separator: TokenTypeRef) -> Self {
        Span {
            text: text.into(),
            separator: Some(separator),
        }
    }

    pub fn is_separator(&self) -> bool {
        self.separator.is_some()
    }
}

/// Splits chunks at registered separators.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    separators: Vec<TokenTypeRef>,
    literal_aware: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a separator after the ones already registered. Other token types are ignored.
    pub fn add_separator(&mut self, separator: TokenTypeRef) {
        if separator.is_separator() {
            self.separators.push(separator);
        }
    }

    /// Reorder separators longest marker first, keeping registration order among equals.
    pub fn sort_longest_first(&mut self) {
        self.separators
            .sort_by(|a, b| b.precedence_len().cmp(&a.precedence_len()));
    }

    /// Turn the literal protection pass on or off.
    pub fn set_literal_aware(&mut self, literal_aware: bool) {
        self.literal_aware = literal_aware;
    }

    pub fn separators(&self) -> &[TokenTypeRef] {
        &self.separators
    }

    /// Split `text` into spans, in input order.
    pub fn split(&self, text: &str) -> Vec<Span> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut spans = vec![Span::text(text)];
        for separator in &self.separators {
            spans = split_at(spans, separator);
        }
        if self.literal_aware {
            demote_inside_literals(&mut spans);
        }
        let spans = coalesce(spans);
        trace!(chunk = text, spans = spans.len(), "split chunk");
        spans
    }
}

/// Text before a separator occurrence, the occurrence, and the text after it.
struct Cut {
    left: String,
    marker: String,
    right: String,
}

/// Find one occurrence of `separator` in `span`. Patterns without groups mark the whole match,
/// one group marks that group, three groups mark the middle one and give the sides.
fn cut(span: &str, separator: &TokenTypeRef) -> Option<Cut> {
    let regex = separator.split_pattern()?;
    let caps = regex.captures(span)?;
    let groups = regex.captures_len() - 1;
    let (left, marker, right) = match groups {
        0 | 1 => {
            let marker = caps.get(groups)?;
            (
                &span[..marker.start()],
                marker.as_str(),
                &span[marker.end()..],
            )
        }
        3 => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2)?.as_str(),
            caps.get(3).map_or("", |m| m.as_str()),
        ),
        _ => return None,
    };
    if marker.is_empty() {
        return None;
    }
    Some(Cut {
        left: left.to_string(),
        marker: marker.to_string(),
        right: right.to_string(),
    })
}

/// Apply one separator until no unclassified span contains it.
fn split_at(spans: Vec<Span>, separator: &TokenTypeRef) -> Vec<Span> {
    // (span, settled): settled text spans were already tried against this separator
    let mut work: Vec<(Span, bool)> = spans.into_iter().map(|s| (s, false)).collect();
    loop {
        let mut changed = false;
        let mut next = Vec::with_capacity(work.len());
        for (span, settled) in work {
            if settled || span.is_separator() {
                next.push((span, settled));
                continue;
            }
            match cut(&span.text, separator) {
                Some(Cut {
                    left,
                    marker,
                    right,
                }) => {
                    changed = true;
                    if !left.is_empty() {
                        next.push((Span::text(left), false));
                    }
                    next.push((Span::separator(marker, separator.clone()), true));
                    if !right.is_empty() {
                        next.push((Span::text(right), false));
                    }
                }
                None => next.push((span, true)),
            }
        }
        work = next;
        if !changed {
            break;
        }
    }
    work.into_iter().map(|(span, _)| span).collect()
}

fn unescaped_count(text: &str, delimiter: char) -> usize {
    let mut count = 0;
    let mut previous = None;
    for ch in text.chars() {
        if ch == delimiter && previous != Some(LITERAL_ESCAPE) {
            count += 1;
        }
        previous = Some(ch);
    }
    count
}

fn demote_inside_literals(spans: &mut [Span]) {
    let last = spans.len().saturating_sub(1);
    for index in 1..last {
        if !spans[index].is_separator() {
            continue;
        }
        let left: String = spans[..index].iter().map(|s| s.text.as_str()).collect();
        let right: String = spans[index + 1..].iter().map(|s| s.text.as_str()).collect();
        let inside = LITERAL_DELIMITERS.iter().any(|&delimiter| {
            unescaped_count(&left, delimiter) % 2 == 1 && unescaped_count(&right, delimiter) % 2 == 1
        });
        if inside {
            spans[index].separator = None;
        }
    }
}

fn coalesce(spans: Vec<Span>) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(previous) if !previous.is_separator() && !span.is_separator() => {
                previous.text.push_str(&span.text);
            }
            _ => merged.push(span),
        }
    }
    merged
}
