//! The three request actions behind the site: contact form, Q&A, and chat.
//!
//! Each call is independent. Nothing is shared between calls except the
//! collaborators handed in at construction, and none of them hold per-request
//! state.

use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::events::{Action, Event, EventSink};
use crate::model::{ChatFlow, ChatInput, ChatMessage, ChatOutput, ChatRole, QaFlow, QaInput, QaOutput};
use crate::web::models::{
    ActionReply, ContactForm, ContactFormState, FieldErrors, FrontendChatMessage, Sender,
};

pub const VALIDATION_FAILED: &str = "Validation failed. Please check your input.";
pub const CONTACT_THANKS: &str = "Thank you for your message! I'll get back to you soon.";
pub const QA_UNAVAILABLE: &str =
    "Sorry, I couldn't process your question right now. Please try again later.";
pub const CHAT_UNAVAILABLE: &str =
    "Sorry, I couldn't process your message right now. Please try again later.";

pub struct Actions {
    qa: Arc<dyn QaFlow>,
    chat: Arc<dyn ChatFlow>,
    events: Arc<dyn EventSink>,
    contact_delay: Duration,
}

impl Actions {
    pub fn new(
        qa: Arc<dyn QaFlow>,
        chat: Arc<dyn ChatFlow>,
        events: Arc<dyn EventSink>,
        contact_delay: Duration,
    ) -> Self {
        Self {
            qa,
            chat,
            events,
            contact_delay,
        }
    }

    /// Validates a contact submission and acknowledges it.
    ///
    /// `_previous` is the state the form last rendered; it is never read.
    pub async fn submit_contact_form(
        &self,
        _previous: Option<&ContactFormState>,
        form: ContactForm,
    ) -> ContactFormState {
        if let Err(errors) = form.validate() {
            return ContactFormState {
                message: VALIDATION_FAILED.to_string(),
                errors: Some(field_errors(&errors)),
                success: false,
            };
        }

        // Delivery (email, storage) is not wired up; the submission is only recorded.
        self.events.record(Event::ContactSubmitted {
            name: form.name,
            email: form.email,
            message: form.message,
        });

        tokio::time::sleep(self.contact_delay).await;

        ContactFormState {
            message: CONTACT_THANKS.to_string(),
            errors: None,
            success: true,
        }
    }

    pub async fn ask_ai(&self, input: QaInput) -> ActionReply<QaOutput> {
        match self.qa.ask(input).await {
            Ok(output) => ActionReply::Ok(output),
            Err(e) => {
                self.events.record(Event::UpstreamFailed {
                    action: Action::AskAi,
                    detail: e.detail(),
                });
                ActionReply::error(QA_UNAVAILABLE)
            }
        }
    }

    pub async fn send_chat_message(
        &self,
        current_message: String,
        history: &[FrontendChatMessage],
    ) -> ActionReply<ChatOutput> {
        let input = ChatInput {
            current_message,
            history: to_flow_history(history),
        };

        match self.chat.chat(input).await {
            Ok(output) => ActionReply::Ok(output),
            Err(e) => {
                // Upstream detail stays in the server log only.
                self.events.record(Event::UpstreamFailed {
                    action: Action::SendChatMessage,
                    detail: e.detail(),
                });
                ActionReply::error(CHAT_UNAVAILABLE)
            }
        }
    }
}

/// Maps browser chat turns onto the chat flow's message schema, one to one.
pub fn to_flow_history(history: &[FrontendChatMessage]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|turn| ChatMessage {
            role: match turn.sender {
                Sender::User => ChatRole::User,
                Sender::Ai => ChatRole::Model,
            },
            content: turn.text.clone(),
        })
        .collect()
}

fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, violations)| {
            let messages = violations
                .iter()
                .map(|violation| match &violation.message {
                    Some(message) => message.to_string(),
                    None => violation.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
