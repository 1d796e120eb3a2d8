use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Leading dots and `..` are rejected separately; `regex` has no lookahead.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Raw contact form fields. Missing fields arrive as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContactForm {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_message"))]
    pub message: String,
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Lengths are counted in UTF-16 code units, as browsers count them.
fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if utf16_len(name) < 2 {
        return Err(rule_error("length", "Name must be at least 2 characters."));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<(), ValidationError> {
    if utf16_len(message) < 10 {
        return Err(rule_error("length", "Message must be at least 10 characters."));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.starts_with('.') || email.contains("..") || !EMAIL_RE.is_match(email) {
        return Err(rule_error("email", "Invalid email address."));
    }
    Ok(())
}

/// Field name to the ordered messages of every rule it broke.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormState {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A chat turn as the browser keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequest {
    pub current_message: String,
    #[serde(default)]
    pub history: Vec<FrontendChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// Either the upstream payload or a generic error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionReply<T> {
    Ok(T),
    Err(ErrorReply),
}

impl<T> ActionReply<T> {
    pub fn error(message: impl Into<String>) -> Self {
        ActionReply::Err(ErrorReply {
            error: message.into(),
        })
    }

    pub fn is_err(&self) -> bool {
        matches!(self, ActionReply::Err(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sender_uses_lowercase_names() {
        let turn: FrontendChatMessage =
            serde_json::from_value(json!({"id": "2", "sender": "ai", "text": "hello"})).unwrap();
        assert_eq!(turn.sender, Sender::Ai);
    }

    #[test]
    fn unknown_sender_is_rejected() {
        let turn = serde_json::from_value::<FrontendChatMessage>(
            json!({"id": "3", "sender": "system", "text": "x"}),
        );
        assert!(turn.is_err());
    }

    #[test]
    fn chat_request_reads_camel_case() {
        let req: SendChatRequest = serde_json::from_value(json!({
            "currentMessage": "what is ssh?",
            "history": [{"id": "1", "sender": "user", "text": "hi"}]
        }))
        .unwrap();
        assert_eq!(req.current_message, "what is ssh?");
        assert_eq!(req.history.len(), 1);
    }

    #[test]
    fn success_state_has_no_errors_key() {
        let state = ContactFormState {
            message: "ok".to_string(),
            errors: None,
            success: true,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value, json!({"message": "ok", "success": true}));
    }

    #[test]
    fn error_reply_serializes_flat() {
        let reply: ActionReply<()> = ActionReply::error("nope");
        assert_eq!(serde_json::to_value(&reply).unwrap(), json!({"error": "nope"}));
    }

    #[test]
    fn email_rule_accepts_common_addresses() {
        for email in ["a@b.com", "alice.o'neil+tag@mail.example.co.uk", "x_y@sub-domain.io"] {
            assert!(validate_email(email).is_ok(), "{}", email);
        }
    }

    #[test]
    fn email_rule_rejects_malformed_addresses() {
        for email in ["", "bad", "a@b", "a@b.c", "a.@example.com", "a@-x.com", "a@example.c0m"] {
            assert!(validate_email(email).is_err(), "{}", email);
        }
    }

    #[test]
    fn lengths_count_utf16_units() {
        assert!(validate_name("\u{1F600}").is_ok());
        assert!(validate_name("\u{e9}").is_err());
        assert!(validate_message("\u{1F600}\u{1F600}\u{1F600}\u{1F600}\u{1F600}").is_ok());
    }

    #[test]
    fn missing_contact_fields_default_to_empty() {
        let form: ContactForm = serde_json::from_value(json!({"name": "Al"})).unwrap();
        assert_eq!(form.email, "");
        assert_eq!(form.message, "");
    }
}
