//! Edit-mode protection: swap badges for placeholder tokens before the user
//! edits a rendered message.
//!
//! Each badge occurrence, located by its exact source byte range, is replaced
//! by its own token; text between badges passes through untouched. Case
//! tokens are labelled with the case title so the editor shows something
//! readable. The mapping keeps the reference as it was rendered, so
//! resolving an unedited text restores the original markup byte for byte.

use std::collections::HashMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extract::scan_badges;
use crate::lookup::{CaseTitleLookup, UNKNOWN_TITLE};
use crate::placeholder::{Delimiters, PlaceholderMapping};
use crate::types::Reference;

/// Editable text and the mapping needed to turn it back into HTML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Protected {
    pub text: String,
    pub mapping: PlaceholderMapping,
}

/// Distinct case ids of the badges in `html`, in first-appearance order.
/// These are the titles [`protect`] wants.
pub fn edit_case_ids(html: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for badge in scan_badges(html) {
        if let Reference::Case { case_id, .. } = badge.reference {
            if !ids.contains(&case_id) {
                ids.push(case_id);
            }
        }
    }
    ids
}

/// Replace every badge in `html` with a placeholder token.
///
/// `titles` maps case id to title; ids missing from it are labelled
/// [`UNKNOWN_TITLE`]. Code tokens are labelled with the badge text.
pub fn protect(html: &str, titles: &HashMap<String, String>) -> Protected {
    let delimiters = Delimiters::choose(html);
    let mut mapping = PlaceholderMapping::new(delimiters);
    let mut text = String::with_capacity(html.len());
    let mut last = 0;

    for (index, badge) in scan_badges(html).into_iter().enumerate() {
        text.push_str(&html[last..badge.span.start]);
        let label = match &badge.reference {
            Reference::Case { case_id, .. } => titles
                .get(case_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_TITLE),
            Reference::Code { display_text, .. } => display_text.as_str(),
        };
        let token = delimiters.token(index, label);
        text.push_str(&token);
        mapping.insert(token, badge.reference);
        last = badge.span.end;
    }
    text.push_str(&html[last..]);

    debug!(badges = mapping.len(), "protected message for editing");
    Protected { text, mapping }
}

/// [`protect`], fetching case titles first.
///
/// One lookup is issued per distinct case id, all concurrently; protection
/// starts once every lookup has settled. A failed lookup is logged and the
/// case falls back to [`UNKNOWN_TITLE`].
pub async fn protect_with_lookup<L>(html: &str, lookup: &L) -> Protected
where
    L: CaseTitleLookup + ?Sized,
{
    let ids = edit_case_ids(html);
    let results = join_all(ids.iter().map(|id| lookup.case_title(id))).await;

    let mut titles = HashMap::with_capacity(ids.len());
    for (id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(title) => {
                titles.insert(id, title);
            }
            Err(e) => warn!(case_id = %id, error = %e, "case title lookup failed; using fallback"),
        }
    }
    protect(html, &titles)
}

// --- tests -------------------------------------------------------------------
