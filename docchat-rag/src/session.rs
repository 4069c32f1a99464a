//! Per-conversation chat state.
//!
//! A [`ChatSession`] is owned by whoever drives the conversation and handed
//! to [`DocumentChat`](crate::DocumentChat) by `&mut` for each action. It
//! records which document is active and the full message log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::SearchResult;

/// Excerpts attached to answers are cut to this many characters.
pub const EXCERPT_CHARS: usize = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Where part of an answer came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub page: u32,
    /// Leading text of the chunk, cut to [`EXCERPT_CHARS`] characters with
    /// a trailing `...` when shortened.
    pub excerpt: String,
    pub score: f32,
}

impl SourceRef {
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            source: result.chunk.source().to_string(),
            page: result.chunk.page(),
            excerpt: excerpt(&result.chunk.text),
            score: result.score,
        }
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Empty for user messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), sources: Vec::new(), created_at: Utc::now() }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self { role: Role::Assistant, content: content.into(), sources, created_at: Utc::now() }
    }
}

/// The document a session is currently chatting about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDocument {
    pub source: String,
    pub chunk_count: usize,
    /// Distinct pages that produced at least one chunk.
    pub page_count: usize,
}

/// One user's conversation with one indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    id: Uuid,
    document: Option<ActiveDocument>,
    messages: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), document: None, messages: Vec::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> Option<&ActiveDocument> {
        self.document.as_ref()
    }

    /// Source id of the active document.
    pub fn source(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.source.as_str())
    }

    /// True once a document with at least one chunk has been indexed.
    pub fn is_ready(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.chunk_count > 0)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Drop the message log, keeping the active document.
    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    pub(crate) fn set_document(&mut self, document: ActiveDocument) {
        self.document = Some(document);
    }

    pub(crate) fn clear_document(&mut self) {
        self.document = None;
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}
