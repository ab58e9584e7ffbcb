//! Lookup collaborators: case titles, case texts and statutory texts.
//!
//! The pipeline never performs I/O itself. Anything that needs an external
//! source goes through one of the traits below; `lexref-client` implements
//! them over HTTP and [`MemoryLookup`] implements them from in-memory tables.
//!
//! Lookup failures never escape to the user. Callers substitute the fallback
//! text from this module instead.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::html::escape_text;
use crate::types::Reference;

/// Label used in place of a case title that could not be fetched.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Class wrapped around highlighted case-text paragraphs.
pub const HIGHLIGHT_CLASS: &str = "case-highlight";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CaseTitleLookup: Send + Sync {
    async fn case_title(&self, case_id: &str) -> Result<String, LookupError>;
}

#[async_trait]
pub trait CaseTextLookup: Send + Sync {
    async fn case_text(&self, case_id: &str) -> Result<CaseText, LookupError>;
}

#[async_trait]
pub trait CodeTextLookup: Send + Sync {
    /// `act` and `section` in [`Reference::lookup_key`] form.
    async fn code_text(&self, act: &str, section: &str) -> Result<String, LookupError>;
}

/// The full text of a reported case, one string per paragraph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseText {
    pub paragraphs: Vec<String>,
}

impl CaseText {
    pub fn new<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
        }
    }

    /// Paragraphs joined by a blank line, those at the given 0-based indexes
    /// wrapped in a highlight span. Out-of-range indexes are ignored.
    pub fn render_highlighted(&self, highlights: &[usize]) -> String {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let p = escape_text(p);
                if highlights.contains(&i) {
                    format!("<span class=\"{HIGHLIGHT_CLASS}\">{p}</span>")
                } else {
                    p
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Shown when statutory text for a clicked code badge cannot be fetched.
pub fn code_text_fallback(act: &str, section: &str) -> String {
    format!("Could not retrieve text for {act}, Section {section}.")
}

/// Shown when the text of a clicked case badge cannot be fetched.
pub fn case_text_fallback(case_id: &str) -> String {
    format!("Could not retrieve case text for {case_id}.")
}

/// The text to show when a badge is clicked.
///
/// Case references render the case text with `highlights` marked; code
/// references fetch the statutory text by [`Reference::lookup_key`]. Any
/// failure yields the matching fallback string.
pub async fn resolve_reference<L>(reference: &Reference, lookup: &L, highlights: &[usize]) -> String
where
    L: CaseTextLookup + CodeTextLookup + ?Sized,
{
    match reference {
        Reference::Case { case_id, .. } => match lookup.case_text(case_id).await {
            Ok(text) => text.render_highlighted(highlights),
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "case text lookup failed");
                case_text_fallback(case_id)
            }
        },
        Reference::Code { act, section, .. } => {
            let Some(key) = reference.lookup_key() else {
                return code_text_fallback(act, section);
            };
            match lookup.code_text(&key.act, &key.section).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(act = %key.act, section = %key.section, error = %e, "code text lookup failed");
                    code_text_fallback(act, section)
                }
            }
        }
    }
}

/// In-memory lookup tables.
///
/// Code texts are keyed by lowercase act and section key, the way
/// [`Reference::lookup_key`] produces them.
#[derive(Debug, Clone, Default)]
pub struct MemoryLookup {
    titles: HashMap<String, String>,
    case_texts: HashMap<String, CaseText>,
    code_texts: HashMap<(String, String), String>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, case_id: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.insert(case_id.into(), title.into());
        self
    }

    pub fn with_case_text(mut self, case_id: impl Into<String>, text: CaseText) -> Self {
        self.case_texts.insert(case_id.into(), text);
        self
    }

    pub fn with_code_text(
        mut self,
        act: impl Into<String>,
        section: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.code_texts
            .insert((act.into(), section.into()), text.into());
        self
    }
}

#[async_trait]
impl CaseTitleLookup for MemoryLookup {
    async fn case_title(&self, case_id: &str) -> Result<String, LookupError> {
        self.titles
            .get(case_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("case {case_id}")))
    }
}

#[async_trait]
impl CaseTextLookup for MemoryLookup {
    async fn case_text(&self, case_id: &str) -> Result<CaseText, LookupError> {
        self.case_texts
            .get(case_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("case {case_id}")))
    }
}

#[async_trait]
impl CodeTextLookup for MemoryLookup {
    async fn code_text(&self, act: &str, section: &str) -> Result<String, LookupError> {
        self.code_texts
            .get(&(act.to_string(), section.to_string()))
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("{act} section {section}")))
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlighted_paragraphs() {
        let text = CaseText::new(["First.", "Second <b>.", "Third."]);
        assert_eq!(
            text.render_highlighted(&[1, 9]),
            "First.\n\n<span class=\"case-highlight\">Second &lt;b&gt;.</span>\n\nThird."
        );
    }

    #[test]
    fn fallback_strings() {
        assert_eq!(
            code_text_fallback("ipc", "302"),
            "Could not retrieve text for ipc, Section 302."
        );
        assert_eq!(
            case_text_fallback("12345"),
            "Could not retrieve case text for 12345."
        );
    }

    #[tokio::test]
    async fn resolves_code_by_lookup_key() {
        let lookup = MemoryLookup::new().with_code_text("hma", "17", "Punishment of bigamy.");
        let r = Reference::code("HMA", "17(a)", "HMA Section: 17(a)");
        assert_eq!(resolve_reference(&r, &lookup, &[]).await, "Punishment of bigamy.");
    }

    #[tokio::test]
    async fn resolves_case_with_highlights() {
        let lookup = MemoryLookup::new().with_case_text("7", CaseText::new(["a", "b"]));
        let r = Reference::case("7", "Case 1");
        assert_eq!(
            resolve_reference(&r, &lookup, &[0]).await,
            "<span class=\"case-highlight\">a</span>\n\nb"
        );
    }

    #[tokio::test]
    async fn failures_fall_back() {
        let lookup = MemoryLookup::new();
        assert_eq!(
            resolve_reference(&Reference::case("9", "Case 1"), &lookup, &[]).await,
            "Could not retrieve case text for 9."
        );
        assert_eq!(
            resolve_reference(&Reference::code("ipc", "302", "IPC Section: 302"), &lookup, &[]).await,
            "Could not retrieve text for ipc, Section 302."
        );
    }

    #[tokio::test]
    async fn memory_titles() {
        let lookup = MemoryLookup::new().with_title("1", "State v. Doe");
        assert_eq!(lookup.case_title("1").await.unwrap(), "State v. Doe");
        assert!(matches!(
            lookup.case_title("2").await,
            Err(LookupError::NotFound(_))
        ));
    }
}
