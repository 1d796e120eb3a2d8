use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ChatFlow, ChatInput, ChatMessage, ChatOutput, ChatRole, QaFlow, QaInput, QaOutput};
use crate::config::CompletionsSettings;
use crate::error::FlowError;

const MIN_TOKENS: usize = 100;
const MAX_TOKENS: usize = 4096;

const QA_PROMPT: &str = "You are an expert in Linux, cybersecurity and networking. \
Answer the user's question accurately and concisely. If the question is outside \
these topics, say so briefly.";

const CHAT_PROMPT: &str = "You are a friendly assistant on a personal portfolio site \
with deep knowledge of Linux, cybersecurity and networking. Keep answers helpful \
and grounded in the conversation so far.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for Message {
    fn from(turn: &ChatMessage) -> Self {
        let role = match turn.role {
            ChatRole::User => Role::User,
            ChatRole::Model => Role::Assistant,
        };
        Self {
            role,
            content: turn.content.clone(),
        }
    }
}

/// Client for an OpenAI-compatible chat completions server.
pub struct CompletionsClient {
    server_url: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: usize,
    client: Client,
}

impl CompletionsClient {
    pub fn new(settings: &CompletionsSettings) -> Self {
        info!("Using chat completions server at: {}", settings.url);

        let max_tokens = clamp_max_tokens(settings.max_tokens);
        Self {
            server_url: settings.url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens,
            client: Client::new(),
        }
    }

    fn payload(&self, messages: &[Message]) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "max_tokens": self.max_tokens
        })
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, FlowError> {
        let url = format!("{}/v1/chat/completions", self.server_url);
        let payload = self.payload(&messages);

        info!(
            "Sending {} messages to completions server with max_tokens: {}",
            messages.len(),
            self.max_tokens
        );
        debug!("Payload: {}", payload);

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(FlowError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| FlowError::Malformed(e.to_string()))?;
        debug!("Response JSON: {}", response_json);

        let content = extract_content(&response_json)?;
        info!("Response length: {} characters", content.len());
        Ok(content)
    }
}

/// Keeps `max_tokens` inside the range completion servers accept.
fn clamp_max_tokens(max_tokens: usize) -> usize {
    if max_tokens < MIN_TOKENS {
        info!("Increasing max_tokens from {} to minimum of {}", max_tokens, MIN_TOKENS);
        MIN_TOKENS
    } else if max_tokens > MAX_TOKENS {
        info!("Capping max_tokens from {} to maximum of {}", max_tokens, MAX_TOKENS);
        MAX_TOKENS
    } else {
        max_tokens
    }
}

fn extract_content(response_json: &Value) -> Result<String, FlowError> {
    response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| FlowError::Malformed("no content in completion response".to_string()))
}

fn qa_messages(input: &QaInput) -> Vec<Message> {
    vec![
        Message {
            role: Role::System,
            content: QA_PROMPT.to_string(),
        },
        Message {
            role: Role::User,
            content: input.question.clone(),
        },
    ]
}

fn chat_messages(input: &ChatInput) -> Vec<Message> {
    let mut messages = Vec::with_capacity(input.history.len() + 2);
    messages.push(Message {
        role: Role::System,
        content: CHAT_PROMPT.to_string(),
    });
    messages.extend(input.history.iter().map(Message::from));
    messages.push(Message {
        role: Role::User,
        content: input.current_message.clone(),
    });
    messages
}

#[async_trait]
impl QaFlow for CompletionsClient {
    async fn ask(&self, input: QaInput) -> Result<QaOutput, FlowError> {
        let answer = self.complete(qa_messages(&input)).await?;
        Ok(QaOutput { answer })
    }
}

#[async_trait]
impl ChatFlow for CompletionsClient {
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, FlowError> {
        let response = self.complete(chat_messages(&input)).await?;
        Ok(ChatOutput { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(max_tokens: usize) -> CompletionsSettings {
        CompletionsSettings {
            url: "http://localhost:8081/".to_string(),
            model: "local-model".to_string(),
            temperature: 0.7,
            top_p: 0.95,
            max_tokens,
        }
    }

    #[test]
    fn max_tokens_is_clamped() {
        assert_eq!(clamp_max_tokens(10), 100);
        assert_eq!(clamp_max_tokens(512), 512);
        assert_eq!(clamp_max_tokens(10_000), 4096);
    }

    #[test]
    fn payload_carries_settings() {
        let client = CompletionsClient::new(&settings(50));
        let payload = client.payload(&[]);
        assert_eq!(payload["model"], "local-model");
        assert_eq!(payload["max_tokens"], 100);
        assert!(payload["messages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn chat_messages_wrap_history() {
        let input = ChatInput {
            current_message: "and ufw?".to_string(),
            history: vec![
                ChatMessage {
                    role: ChatRole::User,
                    content: "what is iptables?".to_string(),
                },
                ChatMessage {
                    role: ChatRole::Model,
                    content: "a packet filter".to_string(),
                },
            ],
        };

        let messages = chat_messages(&input);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[2].content, "a packet filter");
        assert_eq!(messages[3].content, "and ufw?");
    }

    #[test]
    fn qa_messages_put_question_last() {
        let messages = qa_messages(&QaInput {
            question: "What is a subnet mask?".to_string(),
        });
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "What is a subnet mask?");
    }

    #[test]
    fn content_is_extracted() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(extract_content(&body).unwrap(), "hi");
    }

    #[test]
    fn empty_choices_are_malformed() {
        let err = extract_content(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, FlowError::Malformed(_)));
    }
}
