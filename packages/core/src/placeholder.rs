//! Placeholder tokens and the token → reference mapping of one edit session.
//!
//! A token looks like `⟦ref-0: IPC Section: 302⟧`. The delimiter pair is
//! chosen per session so that its opening character never occurs in the
//! HTML being protected, and delimiter characters are stripped from labels,
//! so a token can neither collide with document text nor contain another
//! token.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::html::escape_text;
use crate::types::Reference;

/// Candidate bracket pairs, in preference order.
const BRACKETS: &[(char, char)] = &[('⟦', '⟧'), ('⟪', '⟫'), ('⦃', '⦄'), ('〚', '〛')];

/// Private-use ranges tried once every bracket pair is taken. A private-use
/// character serves as both opener and closer.
const PRIVATE_USE: &[(u32, u32)] = &[(0xE000, 0xF8FF), (0xF0000, 0xFFFFD)];

/// Opening and closing characters of the tokens in one session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        let (open, close) = BRACKETS[0];
        Self { open, close }
    }
}

impl Delimiters {
    /// The first delimiters whose opener does not occur in `html`.
    ///
    /// If `html` uses every candidate, the default pair is returned and a
    /// warning is logged; tokens may then collide with document text.
    pub fn choose(html: &str) -> Self {
        if let Some(&(open, close)) = BRACKETS.iter().find(|(open, _)| !html.contains(*open)) {
            return Self { open, close };
        }
        let used: HashSet<char> = html.chars().collect();
        let free = PRIVATE_USE
            .iter()
            .flat_map(|&(lo, hi)| (lo..=hi).filter_map(char::from_u32))
            .find(|c| !used.contains(c));
        match free {
            Some(c) => Self { open: c, close: c },
            None => {
                warn!("placeholder: every delimiter candidate occurs in the document");
                Self::default()
            }
        }
    }

    /// `{open}ref-{index}: {label}{close}` with `label` entity-encoded and
    /// stripped of delimiter characters.
    pub fn token(&self, index: usize, label: &str) -> String {
        let label: String = escape_text(label)
            .chars()
            .filter(|&c| c != self.open && c != self.close)
            .collect();
        format!("{}ref-{index}: {label}{}", self.open, self.close)
    }
}

/// Token → reference entries plus the delimiters the tokens were built with.
///
/// Lookups are by exact token; entry order carries no meaning. Serialises as
///
/// ```json
/// { "delimiters": { "open": "⟦", "close": "⟧" },
///   "entries": { "⟦ref-0: Case 1⟧": { "kind": "case", ... } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceholderMapping {
    delimiters: Delimiters,
    entries: BTreeMap<String, Reference>,
}

impl PlaceholderMapping {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            entries: BTreeMap::new(),
        }
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Record `token`, replacing any previous entry for it.
    pub fn insert(&mut self, token: String, reference: Reference) {
        self.entries.insert(token, reference);
    }

    pub fn get(&self, token: &str) -> Option<&Reference> {
        self.entries.get(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reference)> {
        self.entries.iter().map(|(t, r)| (t.as_str(), r))
    }
}

// --- tests -------------------------------------------------------------------
