//! Server-side event recording.
//!
//! Actions report what happened through an [`EventSink`] instead of writing
//! to the log directly, so tests can inspect events without capturing output.

use std::sync::Mutex;

use log::{error, info};

/// Which forwarder an upstream failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AskAi,
    SendChatMessage,
}

impl Action {
    pub fn flow_label(&self) -> &'static str {
        match self {
            Action::AskAi => "AI Q&A flow",
            Action::SendChatMessage => "conversational chat flow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A contact form passed validation.
    ContactSubmitted {
        name: String,
        email: String,
        message: String,
    },
    /// An external AI call failed. `detail` holds the full error chain.
    UpstreamFailed { action: Action, detail: String },
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: Event);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: Event) {
        match event {
            Event::ContactSubmitted {
                name,
                email,
                message,
            } => {
                info!("Contact form submission:");
                info!("Name: {}", name);
                info!("Email: {}", email);
                info!("Message: {}", message);
            }
            Event::UpstreamFailed { action, detail } => {
                error!("Error calling {}: {}", action.flow_label(), detail);
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
