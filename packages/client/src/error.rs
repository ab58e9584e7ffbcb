//! Errors raised while talking to the backend.

use lexref::LookupError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request or response failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx HTTP status code.
    #[error("backend returned status {0}")]
    BadStatus(u16),

    /// The backend answered 2xx with an `{"error": ...}` body.
    #[error("backend reported: {0}")]
    Backend(String),

    /// The body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<ClientError> for LookupError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Http(e) if e.is_decode() => LookupError::Malformed(e.to_string()),
            ClientError::Http(e) => LookupError::Transport(e.to_string()),
            ClientError::BadStatus(404) => LookupError::NotFound("resource".into()),
            ClientError::BadStatus(status) => {
                LookupError::Backend(format!("status {status}"))
            }
            ClientError::Backend(msg) => LookupError::Backend(msg),
            ClientError::Decode(msg) => LookupError::Malformed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_into_lookup_errors() {
        assert_eq!(
            LookupError::from(ClientError::BadStatus(500)),
            LookupError::Backend("status 500".into())
        );
        assert!(matches!(
            LookupError::from(ClientError::BadStatus(404)),
            LookupError::NotFound(_)
        ));
        assert_eq!(
            LookupError::from(ClientError::Backend("no such case".into())),
            LookupError::Backend("no such case".into())
        );
    }
}
