//! Client configuration, populated from environment variables.

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the lookup backend.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `LEXREF_BACKEND_URL` | `http://127.0.0.1:8000` | Base URL of the backend |
/// | `LEXREF_TIMEOUT_SECS` | `30` | Per-request timeout in seconds |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `"https://backend.example.com"`.
    pub base_url: String,

    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    /// An unparsable timeout falls back to the default.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("LEXREF_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.into());

        let timeout_secs = std::env::var("LEXREF_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = ClientConfig::new("http://host:9000//", 5);
        assert_eq!(c.base_url, "http://host:9000");
        assert_eq!(c.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(c.timeout_secs, 30);
    }
}
