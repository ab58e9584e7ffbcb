//! Badge rendering: inline tags in, clickable badge markup out.
//!
//! This is the display side of the pipeline. Every badge is a `span` with the
//! `reference-badge` class and the data attributes a click handler needs to
//! resolve the reference:
//!
//! ```text
//! <span data-ref-case="134312774" class="reference-badge">Case 1</span>
//! <span data-ref-code="ipc" data-ref-section="302" class="reference-badge">IPC Section: 302</span>
//! ```
//!
//! The markup is canonical: the sanitizer re-serializes it byte for byte, and
//! [`badge_html`] regenerates it byte for byte from the extracted
//! [`Reference`]. Both properties carry the edit-mode round trip.

use crate::html::{escape_attr, escape_text};
use crate::sanitize::sanitize;
use crate::tags::{escape_stray_openers, scan_inline_tags, InlineTag};
use crate::types::{is_constitution, Reference};

/// Class carried by every badge.
pub const BADGE_CLASS: &str = "reference-badge";

/// How case badges are numbered within one message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaseNumbering {
    /// Number distinct ids in order of first appearance.
    #[default]
    FirstSeen,
    /// Number by position in a list supplied with the reply; ids not in the
    /// list are labelled `Case ?`.
    Known(Vec<String>),
}

impl CaseNumbering {
    pub fn known<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CaseNumbering::Known(ids.into_iter().map(Into::into).collect())
    }

    /// A fresh per-message counter.
    pub fn counter(&self) -> CaseCounter {
        CaseCounter {
            known: match self {
                CaseNumbering::FirstSeen => None,
                CaseNumbering::Known(ids) => Some(ids.clone()),
            },
            seen: Vec::new(),
        }
    }
}

/// Assigns case numbers while a single message is scanned.
#[derive(Debug, Clone)]
pub struct CaseCounter {
    known: Option<Vec<String>>,
    seen: Vec<String>,
}

impl CaseCounter {
    /// 1-based number for `id`, or `None` when a known list does not
    /// contain it.
    pub fn number(&mut self, id: &str) -> Option<usize> {
        if let Some(known) = &self.known {
            return known.iter().position(|k| k == id).map(|i| i + 1);
        }
        match self.seen.iter().position(|s| s == id) {
            Some(i) => Some(i + 1),
            None => {
                self.seen.push(id.to_string());
                Some(self.seen.len())
            }
        }
    }

    pub fn label(&mut self, id: &str) -> String {
        match self.number(id) {
            Some(n) => format!("Case {n}"),
            None => "Case ?".to_string(),
        }
    }
}

/// `"{ACT} Section: {SECTION}"` with the act code uppercased.
pub fn code_label(act: &str, section: &str) -> String {
    format!("{} Section: {}", act.to_uppercase(), section)
}

pub fn article_label(article: &str) -> String {
    format!("Article {article}")
}

pub fn case_badge(case_id: &str, label: &str) -> String {
    format!(
        "<span data-ref-case=\"{}\" class=\"{BADGE_CLASS}\">{}</span>",
        escape_attr(case_id),
        escape_text(label)
    )
}

pub fn code_badge(act: &str, section: &str, label: &str) -> String {
    format!(
        "<span data-ref-code=\"{}\" data-ref-section=\"{}\" class=\"{BADGE_CLASS}\">{}</span>",
        escape_attr(act),
        escape_attr(section),
        escape_text(label)
    )
}

/// One `Article N` badge per article of an Indian Constitution reference,
/// joined by `", "`. `None` for every other reference.
///
/// Falls back to a single section badge if the list holds no article at all
/// (e.g. `","`).
pub fn constitution_badges(reference: &Reference) -> Option<String> {
    let Reference::Code { act, section, .. } = reference else {
        return None;
    };
    if !is_constitution(act) {
        return None;
    }
    let articles = reference.articles();
    if articles.is_empty() {
        return Some(code_badge(act, section, &code_label(act, section)));
    }
    Some(
        articles
            .iter()
            .map(|a| code_badge(act, a, &article_label(a)))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Regenerate the badge markup for a reference.
///
/// Case and code badges show the reference's recorded display text;
/// Indian Constitution references always expand to per-article badges.
pub fn badge_html(reference: &Reference) -> String {
    if let Some(html) = constitution_badges(reference) {
        return html;
    }
    match reference {
        Reference::Case {
            case_id,
            display_text,
        } => case_badge(case_id, display_text),
        Reference::Code {
            act,
            section,
            display_text,
        } => code_badge(act, section, display_text),
    }
}

/// Replace every inline tag in `raw` with badge markup.
///
/// Text between tags is copied through, except that `<case_id:` / `<code:`
/// openers that never formed a tag are entity-escaped so they display as
/// written. The result is not sanitized; see [`render_message`].
pub fn render_tags(raw: &str, numbering: &CaseNumbering) -> String {
    let mut counter = numbering.counter();
    let mut out = String::with_capacity(raw.len() + raw.len() / 2);
    let mut last = 0;

    for m in scan_inline_tags(raw) {
        out.push_str(&escape_stray_openers(&raw[last..m.span.start]));
        match m.tag {
            InlineTag::Case { id } => {
                let label = counter.label(id);
                out.push_str(&case_badge(id, &label));
            }
            InlineTag::Code { act, section } if is_constitution(act) => {
                out.push_str(&badge_html(&Reference::code(act, section, "")));
            }
            InlineTag::Code { act, section } => {
                out.push_str(&code_badge(act, section, &code_label(act, section)));
            }
        }
        last = m.span.end;
    }
    out.push_str(&escape_stray_openers(&raw[last..]));
    out
}

/// Render and sanitize model output for display.
pub fn render_message(raw: &str, numbering: &CaseNumbering) -> String {
    sanitize(&render_tags(raw, numbering))
}

// --- tests -------------------------------------------------------------------
