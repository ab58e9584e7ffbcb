//! Conversation state: the message log and the edit session over its most
//! recent model reply.
//!
//! The pipeline functions are pure; this is the explicit state object a
//! chat surface owns and passes around. Only the most recent model message
//! may be edited, and only while an [`EditSession`] is open.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::lookup::CaseTitleLookup;
use crate::placeholder::PlaceholderMapping;
use crate::protect::{protect, protect_with_lookup, Protected};
use crate::render::{render_message, CaseNumbering};
use crate::resolve::resolve;
use crate::types::{Message, Sender};

/// Opening model message of every conversation.
pub const DEFAULT_GREETING: &str =
    "Hello! I am your legal assistant, <br> Here to assist your legal queries.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("no model message to edit")]
    NoModelMessage,

    #[error("an edit is already in progress for message {0}")]
    EditInProgress(usize),

    #[error("no edit in progress")]
    NoEditInProgress,
}

/// An open edit of one model message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Index of the message being edited.
    pub index: usize,
    /// Placeholder-protected text handed to the editor.
    pub text: String,
    pub mapping: PlaceholderMapping,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    greeting: String,
    messages: Vec<Message>,
    edit: Option<EditSession>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

impl Conversation {
    /// A conversation holding only the model's greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![Message::model(greeting.clone())],
            greeting,
            edit: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Append a user message as typed.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Render and sanitize a model reply, append it, and return its index.
    pub fn push_model_reply(&mut self, raw: &str, numbering: &CaseNumbering) -> usize {
        self.messages
            .push(Message::model(render_message(raw, numbering)));
        self.messages.len() - 1
    }

    /// Messages to send as context with the next model call: everything but
    /// the greeting and blank messages.
    pub fn history(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.text != self.greeting && !m.text.trim().is_empty())
            .collect()
    }

    fn last_model_index(&self) -> Result<usize, ConversationError> {
        if let Some(edit) = &self.edit {
            return Err(ConversationError::EditInProgress(edit.index));
        }
        self.messages
            .iter()
            .rposition(|m| m.sender == Sender::Model)
            .ok_or(ConversationError::NoModelMessage)
    }

    fn open(&mut self, index: usize, protected: Protected) -> &EditSession {
        debug!(index, tokens = protected.mapping.len(), "edit session opened");
        self.edit.insert(EditSession {
            index,
            text: protected.text,
            mapping: protected.mapping,
        })
    }

    /// Protect the most recent model message with the given case titles and
    /// open an edit session over it.
    pub fn begin_edit(
        &mut self,
        titles: &HashMap<String, String>,
    ) -> Result<&EditSession, ConversationError> {
        let index = self.last_model_index()?;
        let protected = protect(&self.messages[index].text, titles);
        Ok(self.open(index, protected))
    }

    /// [`Conversation::begin_edit`], fetching case titles through `lookup`.
    pub async fn begin_edit_with_lookup<L>(
        &mut self,
        lookup: &L,
    ) -> Result<&EditSession, ConversationError>
    where
        L: CaseTitleLookup + ?Sized,
    {
        let index = self.last_model_index()?;
        let protected = protect_with_lookup(&self.messages[index].text, lookup).await;
        Ok(self.open(index, protected))
    }

    /// Resolve the edited text, store it in place of the edited message and
    /// close the session. Returns the message index.
    pub fn commit_edit(&mut self, edited: &str) -> Result<usize, ConversationError> {
        let edit = self.edit.take().ok_or(ConversationError::NoEditInProgress)?;
        self.messages[edit.index].text = resolve(edited, &edit.mapping);
        debug!(index = edit.index, "edit committed");
        Ok(edit.index)
    }

    /// Close the session and leave the message as it was.
    pub fn cancel_edit(&mut self) -> Result<(), ConversationError> {
        self.edit
            .take()
            .map(|_| ())
            .ok_or(ConversationError::NoEditInProgress)
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MemoryLookup;

    const REPLY: &str = "See <code:ipc:302> and <case_id:12345>.";

    #[test]
    fn starts_with_greeting_only() {
        let c = Conversation::default();
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].sender, Sender::Model);
        assert!(c.history().is_empty());
    }

    #[test]
    fn history_skips_greeting_and_blanks() {
        let mut c = Conversation::new("hi");
        c.push_user("What is 302?");
        c.push_user("   ");
        c.push_model_reply(REPLY, &CaseNumbering::FirstSeen);
        let history = c.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "What is 302?");
        assert!(history[1].text.contains("reference-badge"));
    }

    #[test]
    fn unchanged_edit_restores_message() {
        let mut c = Conversation::default();
        c.push_user("q");
        let idx = c.push_model_reply(REPLY, &CaseNumbering::FirstSeen);
        let before = c.messages()[idx].text.clone();

        let titles = HashMap::from([("12345".to_string(), "State v. Doe".to_string())]);
        let text = c.begin_edit(&titles).unwrap().text.clone();
        assert!(text.contains("State v. Doe"));

        assert_eq!(c.commit_edit(&text), Ok(idx));
        assert_eq!(c.messages()[idx].text, before);
        assert!(c.edit_session().is_none());
    }

    #[test]
    fn edit_targets_latest_model_message() {
        let mut c = Conversation::default();
        let first = c.push_model_reply("<case_id:1>", &CaseNumbering::FirstSeen);
        let second = c.push_model_reply("<case_id:2>", &CaseNumbering::FirstSeen);
        c.push_user("later question");
        let original_first = c.messages()[first].text.clone();

        let index = c.begin_edit(&HashMap::new()).unwrap().index;
        assert_eq!(index, second);
        c.commit_edit("rewritten").unwrap();
        assert_eq!(c.messages()[second].text, "rewritten");
        assert_eq!(c.messages()[first].text, original_first);
    }

    #[test]
    fn session_state_errors() {
        let mut c = Conversation::default();
        assert_eq!(c.commit_edit("x"), Err(ConversationError::NoEditInProgress));
        assert_eq!(c.cancel_edit(), Err(ConversationError::NoEditInProgress));

        c.begin_edit(&HashMap::new()).unwrap();
        assert_eq!(
            c.begin_edit(&HashMap::new()).map(|s| s.index),
            Err(ConversationError::EditInProgress(0))
        );
        assert_eq!(c.cancel_edit(), Ok(()));
    }

    #[test]
    fn cancel_leaves_message_untouched() {
        let mut c = Conversation::default();
        let idx = c.push_model_reply(REPLY, &CaseNumbering::FirstSeen);
        let before = c.messages()[idx].text.clone();
        c.begin_edit(&HashMap::new()).unwrap();
        c.cancel_edit().unwrap();
        assert_eq!(c.messages()[idx].text, before);
    }

    #[test]
    fn no_model_message() {
        let mut c = Conversation {
            greeting: String::new(),
            messages: vec![Message::user("only me")],
            edit: None,
        };
        assert_eq!(
            c.begin_edit(&HashMap::new()).map(|s| s.index),
            Err(ConversationError::NoModelMessage)
        );
    }

    #[tokio::test]
    async fn edit_with_lookup_uses_titles() {
        let mut c = Conversation::default();
        c.push_model_reply(REPLY, &CaseNumbering::FirstSeen);
        let lookup = MemoryLookup::new().with_title("12345", "State v. Doe");
        let session = c.begin_edit_with_lookup(&lookup).await.unwrap();
        assert!(session.text.contains("⟦ref-1: State v. Doe⟧"));
    }
}
