//! [`BackendClient`]: the lookup traits over HTTP.

use async_trait::async_trait;
use lexref::{CaseText, CaseTextLookup, CaseTitleLookup, CodeTextLookup, LookupError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{CaseTextResponse, CaseTitleResponse, CodeTextResponse};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Fetches case titles, case texts and statutory texts from the backend.
///
/// Holds a cloneable [`reqwest::Client`] (which pools connections), so one
/// instance can serve every lookup of a session, including the concurrent
/// title fetches of edit-mode protection.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Wrap a pre-configured client (e.g. with a timeout).
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::new(client, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{endpoint}/{seg}/{seg}…` with each segment percent-encoded.
    fn url(&self, endpoint: &str, segments: &[&str]) -> String {
        let mut url = format!("{}/{endpoint}", self.base_url);
        for seg in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(seg));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        debug!("backend: GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::BadStatus(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn fetch_case_title(&self, case_id: &str) -> Result<String, ClientError> {
        let url = self.url("fetch-case-title", &[case_id]);
        let body: CaseTitleResponse = self.get_json(&url).await?;
        body.into_title().map_err(ClientError::Backend)
    }

    pub async fn fetch_case_text(&self, case_id: &str) -> Result<CaseText, ClientError> {
        let url = self.url("fetch-case-text", &[case_id]);
        let body: CaseTextResponse = self.get_json(&url).await?;
        Ok(CaseText {
            paragraphs: body.paragraphs,
        })
    }

    /// `act` and `section` in lookup-key form (lowercase act, leading
    /// section numeral).
    pub async fn fetch_code_text(&self, act: &str, section: &str) -> Result<String, ClientError> {
        let url = self.url("fetch-code-text", &[act, section]);
        let body: CodeTextResponse = self.get_json(&url).await?;
        Ok(body.content)
    }
}

#[async_trait]
impl CaseTitleLookup for BackendClient {
    async fn case_title(&self, case_id: &str) -> Result<String, LookupError> {
        self.fetch_case_title(case_id).await.map_err(|e| {
            warn!("backend: case title {case_id:?} failed: {e}");
            e.into()
        })
    }
}

#[async_trait]
impl CaseTextLookup for BackendClient {
    async fn case_text(&self, case_id: &str) -> Result<CaseText, LookupError> {
        self.fetch_case_text(case_id).await.map_err(|e| {
            warn!("backend: case text {case_id:?} failed: {e}");
            e.into()
        })
    }
}

#[async_trait]
impl CodeTextLookup for BackendClient {
    async fn code_text(&self, act: &str, section: &str) -> Result<String, LookupError> {
        self.fetch_code_text(act, section).await.map_err(|e| {
            warn!("backend: code text {act}/{section} failed: {e}");
            e.into()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::{routing::get, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Spawn a loopback axum server and return its base URL.
    async fn spawn_mock_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn echo_title(Path(case_id): Path<String>) -> Json<Value> {
        Json(json!({ "title": format!("title of {case_id}") }))
    }

    fn client(base: &str) -> BackendClient {
        BackendClient::new(Client::new(), base)
    }

    #[test]
    fn url_segments_are_percent_encoded() {
        let c = client("http://h/");
        assert_eq!(
            c.url("fetch-case-title", &["[2021] 7 SCR 571"]),
            "http://h/fetch-case-title/%5B2021%5D%207%20SCR%20571"
        );
        assert_eq!(
            c.url("fetch-code-text", &["hma", "17"]),
            "http://h/fetch-code-text/hma/17"
        );
    }

    // -----------------------------------------------------------------------
    // Test: bracketed ids arrive decoded at the backend
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fetches_title_for_bracketed_id() {
        let app = Router::new().route("/fetch-case-title/{case_id}", get(echo_title));
        let base = spawn_mock_server(app).await;

        let title = client(&base).case_title("[2021] 7 SCR 571").await.unwrap();
        assert_eq!(title, "title of [2021] 7 SCR 571");
    }

    // -----------------------------------------------------------------------
    // Test: error bodies and bad statuses become lookup errors
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn error_body_is_backend_error() {
        let app = Router::new().route(
            "/fetch-case-title/{case_id}",
            get(|| async { Json(json!({ "error": "Case not found" })) }),
        );
        let base = spawn_mock_server(app).await;

        let err = client(&base).case_title("1").await.unwrap_err();
        assert_eq!(err, LookupError::Backend("Case not found".into()));
    }

    #[tokio::test]
    async fn missing_title_uses_placeholder() {
        let app = Router::new().route(
            "/fetch-case-title/{case_id}",
            get(|| async { Json(json!({})) }),
        );
        let base = spawn_mock_server(app).await;

        assert_eq!(
            client(&base).case_title("1").await.unwrap(),
            "No title available"
        );
    }

    #[tokio::test]
    async fn server_error_status() {
        let app = Router::new().route(
            "/fetch-code-text/{act}/{section}",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_mock_server(app).await;

        let err = client(&base).code_text("ipc", "302").await.unwrap_err();
        assert_eq!(err, LookupError::Backend("status 500".into()));
    }

    #[tokio::test]
    async fn malformed_body() {
        let app = Router::new().route(
            "/fetch-case-text/{case_id}",
            get(|| async { Json(json!({ "text": "wrong shape" })) }),
        );
        let base = spawn_mock_server(app).await;

        let err = client(&base).case_text("1").await.unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let app = Router::new().route(
            "/fetch-code-text/{act}/{section}",
            get(|| async { "<html>gateway page</html>" }),
        );
        let base = spawn_mock_server(app).await;

        let err = client(&base).code_text("ipc", "302").await.unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .case_title("1")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }

    #[tokio::test]
    async fn fetches_case_and_code_text() {
        let app = Router::new()
            .route(
                "/fetch-case-text/{case_id}",
                get(|| async { Json(json!({ "paragraphs": ["one", "two"] })) }),
            )
            .route(
                "/fetch-code-text/{act}/{section}",
                get(|Path((act, section)): Path<(String, String)>| async move {
                    Json(json!({ "content": format!("{act} s.{section}") }))
                }),
            );
        let base = spawn_mock_server(app).await;
        let c = client(&base);

        assert_eq!(c.case_text("9").await.unwrap().paragraphs, vec!["one", "two"]);
        assert_eq!(c.code_text("hma", "17").await.unwrap(), "hma s.17");
    }
}
