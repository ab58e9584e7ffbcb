//! Badge-markup extraction: references back out of rendered HTML.
//!
//! A `span` carrying `data-ref-case` is a case badge; one carrying both
//! `data-ref-code` and `data-ref-section` is a code badge. Attribute order,
//! quoting style and the `class` attribute do not matter. The decoded text
//! content of the span is the reference's display text.

use std::ops::Range;

use tracing::debug;

use crate::html::{decode_entities, tokenize, StartTag, Token};
use crate::types::Reference;

/// A badge found in HTML and the byte range of its whole element, from `<span`
/// through `</span>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeMatch {
    pub reference: Reference,
    pub span: Range<usize>,
}

enum BadgeKind {
    Case(String),
    Code(String, String),
}

fn badge_kind(tag: &StartTag) -> Option<BadgeKind> {
    if tag.name != "span" || tag.self_closing {
        return None;
    }
    if let Some(id) = tag.attr("data-ref-case").filter(|v| !v.is_empty()) {
        return Some(BadgeKind::Case(id.to_string()));
    }
    match (tag.attr("data-ref-code"), tag.attr("data-ref-section")) {
        (Some(act), Some(section)) if !act.is_empty() && !section.is_empty() => {
            Some(BadgeKind::Code(act.to_string(), section.to_string()))
        }
        _ => None,
    }
}

struct OpenBadge {
    kind: BadgeKind,
    start: usize,
    depth: usize,
    text: String,
}

/// Every complete badge in `html`, in document order.
///
/// A badge whose `span` is never closed is not a badge. Spans nested inside a
/// badge count toward its text and are not badges of their own.
pub fn scan_badges(html: &str) -> Vec<BadgeMatch> {
    let mut found = Vec::new();
    let mut open: Option<OpenBadge> = None;

    for (range, token) in tokenize(html) {
        if open.is_none() {
            if let Token::Start(tag) = token {
                if let Some(kind) = badge_kind(&tag) {
                    open = Some(OpenBadge {
                        kind,
                        start: range.start,
                        depth: 1,
                        text: String::new(),
                    });
                }
            }
            continue;
        }
        let Some(badge) = open.as_mut() else {
            continue;
        };

        let mut closed = false;
        match token {
            Token::Start(tag) if tag.name == "span" && !tag.self_closing => badge.depth += 1,
            Token::Text(text) => badge.text.push_str(&decode_entities(text)),
            Token::End(name) if name == "span" => {
                badge.depth -= 1;
                closed = badge.depth == 0;
            }
            _ => {}
        }

        if closed {
            if let Some(badge) = open.take() {
                found.push(BadgeMatch {
                    reference: into_reference(badge.kind, badge.text),
                    span: badge.start..range.end,
                });
            }
        }
    }

    if let Some(badge) = open {
        debug!(offset = badge.start, "unterminated reference badge ignored");
    }
    found
}

fn into_reference(kind: BadgeKind, display_text: String) -> Reference {
    match kind {
        BadgeKind::Case(case_id) => Reference::Case {
            case_id,
            display_text,
        },
        BadgeKind::Code(act, section) => Reference::Code {
            act,
            section,
            display_text,
        },
    }
}

/// The references carried by badge markup in `html`, in document order.
pub fn extract_badges(html: &str) -> Vec<Reference> {
    scan_badges(html).into_iter().map(|m| m.reference).collect()
}

// --- tests -------------------------------------------------------------------
