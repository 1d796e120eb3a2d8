//! External AI capabilities.
//!
//! The Q&A and chat flows are opaque collaborators. Everything here is the
//! boundary: payload shapes, the traits the actions call, and the HTTP
//! backends that implement them.

pub mod completions;
pub mod flow_server;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;

pub use completions::CompletionsClient;
pub use flow_server::FlowServerClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaInput {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaOutput {
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// A chat turn in the shape the chat flow expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub current_message: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOutput {
    pub response: String,
}

#[async_trait]
pub trait QaFlow: Send + Sync {
    async fn ask(&self, input: QaInput) -> Result<QaOutput, FlowError>;
}

#[async_trait]
pub trait ChatFlow: Send + Sync {
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, FlowError>;
}
