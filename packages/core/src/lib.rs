//! Reference-tag pipeline for legal-assistant chat output.
//!
//! A language model cites sources with inline tags (`<case_id:…>`,
//! `<code:ACT:SECTION>`). This crate turns those tags into clickable badge
//! markup, keeps that markup safe, and carries the badges intact through a
//! free-text editing round trip. It is the foundation for the `lexref` CLI,
//! the `lexref-wasm` browser bindings, and the `lexref-client` HTTP lookups.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Core data types: [`Reference`], [`Message`], [`Sender`], [`OpinionResponse`] |
//! | [`tags`] | Inline tag scanning and extraction via [`extract_inline`] |
//! | [`render`] | Badge rendering and case numbering via [`render_message`] |
//! | [`html`] | Fragment tokenizer and entity codec |
//! | [`sanitize`] | Allow-list sanitization via [`sanitize()`](sanitize::sanitize) |
//! | [`extract`] | Badge-markup extraction via [`extract_badges`] |
//! | [`placeholder`] | Placeholder tokens and [`PlaceholderMapping`] |
//! | [`protect`] | Edit-mode protection via [`protect()`](protect::protect) |
//! | [`resolve`] | Placeholder resolution via [`resolve()`](resolve::resolve) |
//! | [`lookup`] | Lookup traits for titles and texts, with fallbacks |
//! | [`conversation`] | Message log and edit-session state |
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use lexref::{protect, render_message, resolve, CaseNumbering};
//!
//! let html = render_message("See <code:ipc:302> and <case_id:12345>.", &CaseNumbering::FirstSeen);
//!
//! let titles = HashMap::from([("12345".to_string(), "State v. Doe".to_string())]);
//! let editable = protect(&html, &titles);
//! assert!(editable.text.contains("State v. Doe"));
//!
//! // Saving without changes gives back the original markup.
//! assert_eq!(resolve(&editable.text, &editable.mapping), html);
//! ```

pub mod conversation;
pub mod extract;
pub mod html;
pub mod lookup;
pub mod placeholder;
pub mod protect;
pub mod render;
pub mod resolve;
pub mod sanitize;
pub mod tags;
pub mod types;

pub use conversation::{Conversation, ConversationError, EditSession};
pub use extract::{extract_badges, scan_badges, BadgeMatch};
pub use lookup::{
    resolve_reference, CaseText, CaseTextLookup, CaseTitleLookup, CodeTextLookup, LookupError,
    MemoryLookup, UNKNOWN_TITLE,
};
pub use placeholder::{Delimiters, PlaceholderMapping};
pub use protect::{edit_case_ids, protect, protect_with_lookup, Protected};
pub use render::{badge_html, render_message, render_tags, CaseNumbering, BADGE_CLASS};
pub use resolve::resolve;
pub use sanitize::sanitize;
pub use tags::{extract_inline, scan_inline_tags, InlineTag, TagMatch};
pub use types::{act_name, section_key, CodeKey, Message, OpinionResponse, Reference, Sender};
