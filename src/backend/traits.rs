//! Backend trait definitions
//!
//! Defines the ChatInvoker trait that every chat backend implements.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────
// Chat Messages
// ─────────────────────────────────────────────────────────────────

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One question put to the model
///
/// System instructions are sent in order, followed by a single user message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: Vec<String>,
    pub user: String,
}

impl ChatRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: Vec::new(),
            user: user.into(),
        }
    }

    /// Append a system instruction
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system.push(instruction.into());
        self
    }

    /// Wire-order message list
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.system
            .iter()
            .map(ChatMessage::system)
            .chain(std::iter::once(ChatMessage::user(&self.user)))
            .collect()
    }

    /// Total characters across every message
    pub fn prompt_chars(&self) -> usize {
        self.system.iter().map(String::len).sum::<usize>() + self.user.len()
    }
}

// ─────────────────────────────────────────────────────────────────
// ChatInvoker Trait
// ─────────────────────────────────────────────────────────────────

/// A single chat-completion call against one already selected model
///
/// The trait is object-safe so the debate core can hold any backend behind
/// [`SharedInvoker`].
#[async_trait]
pub trait ChatInvoker: Send + Sync {
    /// Backend name (e.g., "openai", "mock")
    fn name(&self) -> &'static str;

    /// Model identifier that answers the requests
    fn model(&self) -> &str;

    /// Send the request and return the reply text
    async fn invoke(&self, request: ChatRequest) -> Result<String>;
}

/// Type alias for a shared invoker reference
pub type SharedInvoker = Arc<dyn ChatInvoker>;

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
