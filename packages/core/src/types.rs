//! Core data types for the reference pipeline.
//!
//! This module defines the records that flow through every stage:
//! [`Reference`], [`Message`], [`Sender`], and [`OpinionResponse`].
//! All types serialise to and from JSON so that outer surfaces (the CLI,
//! the WASM bindings) can hand them across process and language boundaries.

use serde::{Deserialize, Serialize};

/// Act code whose sections are article lists rather than single sections.
pub const INDIAN_CONSTITUTION: &str = "indian_constitution";

/// Well-known act codes and their human-readable names.
///
/// Unknown act codes are still valid references; this table only feeds
/// [`act_name`].
const ACT_NAMES: &[(&str, &str)] = &[
    ("ipc", "Indian Penal Code"),
    ("crpc", "Code of Criminal Procedure"),
    ("dva", "Domestic Violence Act"),
    ("hma", "Hindu Marriage Act"),
    ("ida", "Indian Divorce Act"),
    ("sma", "Special Marriage Act"),
    ("cpc", "Code of Civil Procedure"),
    ("bns", "Bengal Nuisance Act"),
    ("iea", "Indian Evidence Act"),
    ("mva", "Motor Vehicles Act"),
    ("nia", "Negotiable Instruments Act"),
    (
        "public_worship_act",
        "Kerala Hindu Places of Public Worship (Authorisation of Entry) Act",
    ),
    (INDIAN_CONSTITUTION, "Indian Constitution"),
];

/// Human-readable name of a well-known act code (case-insensitive).
pub fn act_name(act: &str) -> Option<&'static str> {
    ACT_NAMES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(act))
        .map(|(_, name)| *name)
}

/// Whether `act` names the Indian Constitution. The act code must match
/// exactly; `INDIAN_CONSTITUTION` is an ordinary act.
pub fn is_constitution(act: &str) -> bool {
    act == INDIAN_CONSTITUTION
}

/// The leading section number used by the code-text collaborator:
/// everything before the first `(`, trimmed.
///
/// `"17(a)"` → `"17"`, `"302"` → `"302"`.
pub fn section_key(section: &str) -> &str {
    match section.find('(') {
        Some(i) => section[..i].trim(),
        None => section.trim(),
    }
}

/// A tagged pointer to an external legal source.
///
/// A reference never lives on its own: it is created while scanning one
/// message and lives only inside badge markup (as data attributes) or
/// inside a [`PlaceholderMapping`](crate::PlaceholderMapping) during an edit.
///
/// Serialises with a `kind` discriminator:
///
/// ```json
/// { "kind": "case", "caseId": "[2021] 7 SCR 571", "displayText": "Case 1" }
/// { "kind": "code", "act": "ipc", "section": "302", "displayText": "IPC Section: 302" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Reference {
    /// A reported case, identified by a bare id or a bracketed citation.
    #[serde(rename_all = "camelCase")]
    Case {
        case_id: String,
        display_text: String,
    },
    /// A statutory provision.
    ///
    /// For the Indian Constitution `section` may be a comma-separated
    /// article list; it is kept whole as one logical reference.
    #[serde(rename_all = "camelCase")]
    Code {
        act: String,
        section: String,
        display_text: String,
    },
}

/// The `(act, section)` pair in the form the code-text collaborator expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeKey {
    /// Lowercase act code.
    pub act: String,
    /// Leading section numeral, see [`section_key`].
    pub section: String,
}

impl Reference {
    pub fn case(case_id: impl Into<String>, display_text: impl Into<String>) -> Self {
        Reference::Case {
            case_id: case_id.into(),
            display_text: display_text.into(),
        }
    }

    pub fn code(
        act: impl Into<String>,
        section: impl Into<String>,
        display_text: impl Into<String>,
    ) -> Self {
        Reference::Code {
            act: act.into(),
            section: section.into(),
            display_text: display_text.into(),
        }
    }

    /// The visible badge text this reference was created with.
    pub fn display_text(&self) -> &str {
        match self {
            Reference::Case { display_text, .. } | Reference::Code { display_text, .. } => {
                display_text
            }
        }
    }

    /// The individual article numbers of an Indian Constitution reference,
    /// split on commas and trimmed. Empty for every other reference.
    pub fn articles(&self) -> Vec<&str> {
        match self {
            Reference::Code { act, section, .. } if is_constitution(act) => section
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The collaborator lookup key for code references.
    pub fn lookup_key(&self) -> Option<CodeKey> {
        match self {
            Reference::Code { act, section, .. } => Some(CodeKey {
                act: act.to_ascii_lowercase(),
                section: section_key(section).to_string(),
            }),
            Reference::Case { .. } => None,
        }
    }
}

/// Who authored a [`Message`].
///
/// Serialises as a lowercase string (`"user"` / `"model"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Model => write!(f, "model"),
        }
    }
}

/// Parses a [`Sender`] from its lowercase wire-format string.
impl std::str::FromStr for Sender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "model" => Ok(Sender::Model),
            _ => Err(format!(
                "unknown sender {:?}; expected one of: user, model",
                s
            )),
        }
    }
}

/// One entry of a conversation log.
///
/// For model messages `text` is sanitized badge HTML; for user messages it
/// is the text as typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Model,
        }
    }
}

/// The backend's generated-opinion payload.
///
/// ```json
/// { "opinion": "... <case_id:134312774> ...", "ref_case": { "134312774": [2, 5] } }
/// ```
///
/// `ref_case` maps each cited case id to the paragraph indexes worth
/// highlighting. Its key order is the order the backend listed the cases in
/// and drives known-list numbering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpinionResponse {
    pub opinion: String,

    #[serde(default)]
    pub ref_case: serde_json::Map<String, serde_json::Value>,
}

impl OpinionResponse {
    /// Case ids in backend order.
    pub fn known_case_ids(&self) -> Vec<String> {
        self.ref_case.keys().cloned().collect()
    }

    /// Paragraph indexes to highlight for `case_id`. Non-numeric entries are
    /// skipped.
    pub fn highlights(&self, case_id: &str) -> Vec<usize> {
        self.ref_case
            .get(case_id)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_u64())
                    .map(|n| n as usize)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_serialises_with_kind_tag() {
        let r = Reference::case("[2021] 7 SCR 571", "Case 1");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["kind"], "case");
        assert_eq!(json["caseId"], "[2021] 7 SCR 571");
        assert_eq!(json["displayText"], "Case 1");

        let back: Reference = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn code_reference_json_shape() {
        let json = r#"{"kind":"code","act":"ipc","section":"302","displayText":"IPC Section: 302"}"#;
        let r: Reference = serde_json::from_str(json).unwrap();
        assert_eq!(r, Reference::code("ipc", "302", "IPC Section: 302"));
    }

    #[test]
    fn section_key_strips_parenthetical() {
        assert_eq!(section_key("17(a)"), "17");
        assert_eq!(section_key("302"), "302");
        assert_eq!(section_key(" 498A (1)"), "498A");
    }

    #[test]
    fn lookup_key_lowercases_act() {
        let r = Reference::code("CrPC", "125(1)", "CRPC Section: 125(1)");
        assert_eq!(
            r.lookup_key(),
            Some(CodeKey {
                act: "crpc".into(),
                section: "125".into()
            })
        );
        assert_eq!(Reference::case("1", "Case 1").lookup_key(), None);
    }

    #[test]
    fn articles_only_for_constitution() {
        let r = Reference::code(INDIAN_CONSTITUTION, "14, 15,16", "Article 14");
        assert_eq!(r.articles(), vec!["14", "15", "16"]);
        assert!(Reference::code("INDIAN_CONSTITUTION", "14,15", "").articles().is_empty());

        let ipc = Reference::code("ipc", "14,15", "IPC Section: 14,15");
        assert!(ipc.articles().is_empty());
    }

    #[test]
    fn act_names() {
        assert_eq!(act_name("ipc"), Some("Indian Penal Code"));
        assert_eq!(act_name("HMA"), Some("Hindu Marriage Act"));
        assert_eq!(act_name("xyz"), None);
    }

    #[test]
    fn sender_parse_and_display() {
        assert_eq!("model".parse::<Sender>(), Ok(Sender::Model));
        assert!("bot".parse::<Sender>().is_err());
        assert_eq!(Sender::User.to_string(), "user");
    }

    #[test]
    fn opinion_response_keeps_backend_order() {
        let json = r#"{"opinion":"x","ref_case":{"900":[1],"12":[0,3],"455":"bad"}}"#;
        let op: OpinionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(op.known_case_ids(), vec!["900", "12", "455"]);
        assert_eq!(op.highlights("12"), vec![0, 3]);
        assert!(op.highlights("455").is_empty());
        assert!(op.highlights("missing").is_empty());
    }

    #[test]
    fn opinion_response_without_ref_case() {
        let op: OpinionResponse = serde_json::from_str(r#"{"opinion":"x"}"#).unwrap();
        assert!(op.known_case_ids().is_empty());
    }
}
