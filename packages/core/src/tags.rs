//! Inline reference tags emitted by the language model.
//!
//! ```text
//! <case_id:134312774>          <case_id:[2021] 7 SCR 571>
//! <code:ipc:302>               <code:hma:17(a)>
//! <code:indian_constitution:14,15,16>
//! ```
//!
//! Anything that does not match the grammar is ordinary text and is never
//! an error.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::render::{code_label, CaseNumbering};
use crate::types::Reference;

/// `<case_id:ID>` or `<code:ACT:SECTION>`, scanned together so matches come
/// out in document order across both kinds.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<case_id:([\w\[\]\s]+)>|<code:(\w+):([\w(),\s]+)>")
        .expect("invalid inline tag regex")
});

/// Tag openers that did not form a complete tag.
static STRAY_OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(case_id|code):").expect("invalid stray opener regex")
});

/// One recognised inline tag, borrowing from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineTag<'a> {
    Case { id: &'a str },
    Code { act: &'a str, section: &'a str },
}

/// An [`InlineTag`] and the byte range it occupies in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'a> {
    pub tag: InlineTag<'a>,
    pub span: Range<usize>,
}

/// All inline tags in `raw`, left to right.
pub fn scan_inline_tags(raw: &str) -> Vec<TagMatch<'_>> {
    TAG_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(id), _, _) => InlineTag::Case { id: id.as_str() },
                (None, Some(act), Some(section)) => InlineTag::Code {
                    act: act.as_str(),
                    section: section.as_str(),
                },
                _ => return None,
            };
            Some(TagMatch {
                tag,
                span: whole.range(),
            })
        })
        .collect()
}

/// Extract the references carried by inline tags, in document order.
///
/// Case references are labelled with first-seen numbering, the labels Badge
/// Rendering would give them when no case list is known. An Indian
/// Constitution tag stays one reference whatever its article count.
pub fn extract_inline(raw: &str) -> Vec<Reference> {
    let mut numbering = CaseNumbering::FirstSeen.counter();
    scan_inline_tags(raw)
        .into_iter()
        .map(|m| match m.tag {
            InlineTag::Case { id } => Reference::case(id, numbering.label(id)),
            InlineTag::Code { act, section } => {
                Reference::code(act, section, code_label(act, section))
            }
        })
        .collect()
}

/// Escape tag openers left in text between recognised tags so a malformed
/// tag displays literally instead of being read as an element.
pub(crate) fn escape_stray_openers(text: &str) -> std::borrow::Cow<'_, str> {
    STRAY_OPENER_RE.replace_all(text, "&lt;$1:")
}

// --- tests -------------------------------------------------------------------
