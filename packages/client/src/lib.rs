//! HTTP lookups for the lexref pipeline.
//!
//! [`BackendClient`] implements the [`lexref`] lookup traits
//! ([`CaseTitleLookup`](lexref::CaseTitleLookup),
//! [`CaseTextLookup`](lexref::CaseTextLookup),
//! [`CodeTextLookup`](lexref::CodeTextLookup)) against the legal-data
//! backend, configured through [`ClientConfig`].
//!
//! ```rust,ignore
//! use lexref_client::{BackendClient, ClientConfig};
//!
//! let backend = BackendClient::from_config(&ClientConfig::from_env())?;
//! let protected = lexref::protect_with_lookup(&html, &backend).await;
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod error;

pub use backend::BackendClient;
pub use config::ClientConfig;
pub use error::ClientError;
