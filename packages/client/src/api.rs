//! Response bodies of the lookup backend.
//!
//! | Call | Request | Body |
//! |------|---------|------|
//! | case title | `GET /fetch-case-title/{case_id}` | [`CaseTitleResponse`] |
//! | case text | `GET /fetch-case-text/{case_id}` | [`CaseTextResponse`] |
//! | code text | `GET /fetch-code-text/{act}/{section}` | [`CodeTextResponse`] |

use serde::{Deserialize, Serialize};

/// Title used when the backend answers without one.
pub const NO_TITLE: &str = "No title available";

/// ```json
/// { "title": "State v. Doe" }
/// { "error": "case not found" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseTitleResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseTitleResponse {
    /// The title, [`NO_TITLE`] if absent or empty, or the backend's error.
    pub fn into_title(self) -> Result<String, String> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(error);
        }
        Ok(self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseTextResponse {
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeTextResponse {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_variants() {
        let ok: CaseTitleResponse = serde_json::from_str(r#"{"title":"State v. Doe"}"#).unwrap();
        assert_eq!(ok.into_title(), Ok("State v. Doe".into()));

        let missing: CaseTitleResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.into_title(), Ok(NO_TITLE.into()));

        let err: CaseTitleResponse = serde_json::from_str(r#"{"error":"not found"}"#).unwrap();
        assert_eq!(err.into_title(), Err("not found".into()));
    }
}
