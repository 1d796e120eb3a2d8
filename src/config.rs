//! Settings read from environment variables.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    FlowServer,
    Completions,
}

#[derive(Debug, Clone)]
pub struct FlowServerSettings {
    pub url: String,
    pub qa_flow: String,
    pub chat_flow: String,
}

#[derive(Debug, Clone)]
pub struct CompletionsSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub flow_server: FlowServerSettings,
    pub completions: CompletionsSettings,
    pub contact_delay: Duration,
    pub templates_dir: String,
    pub static_dir: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or unparsable numbers use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match text("AI_BACKEND", "flow").as_str() {
            "flow" => Backend::FlowServer,
            "completions" => Backend::Completions,
            other => bail!("unknown AI_BACKEND `{}` (expected `flow` or `completions`)", other),
        };

        Ok(Self {
            host: text("HOST", "127.0.0.1"),
            port: parsed(&lookup, "PORT", 8080),
            backend,
            flow_server: FlowServerSettings {
                url: text("FLOW_SERVER_URL", "http://localhost:3400"),
                qa_flow: text("QA_FLOW", "linuxCybersecurityNetworkingQA"),
                chat_flow: text("CHAT_FLOW", "conversationalChat"),
            },
            completions: CompletionsSettings {
                url: text("COMPLETIONS_URL", "http://localhost:8081"),
                model: text("MODEL", "local-model"),
                temperature: parsed(&lookup, "TEMPERATURE", 0.7),
                top_p: parsed(&lookup, "TOP_P", 0.95),
                max_tokens: parsed(&lookup, "MAX_TOKENS", 512),
            },
            contact_delay: Duration::from_millis(parsed(&lookup, "CONTACT_DELAY_MS", 1000)),
            templates_dir: text("TEMPLATES_DIR", "templates"),
            static_dir: text("STATIC_DIR", "static"),
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.backend, Backend::FlowServer);
        assert_eq!(settings.flow_server.qa_flow, "linuxCybersecurityNetworkingQA");
        assert_eq!(settings.completions.max_tokens, 512);
        assert_eq!(settings.contact_delay, Duration::from_secs(1));
    }

    #[test]
    fn values_are_read() {
        let settings = settings_from(&[
            ("AI_BACKEND", "completions"),
            ("PORT", "9000"),
            ("CONTACT_DELAY_MS", "0"),
            ("TEMPERATURE", "0.2"),
        ])
        .unwrap();
        assert_eq!(settings.backend, Backend::Completions);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.contact_delay, Duration::ZERO);
        assert_eq!(settings.completions.temperature, 0.2);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let settings = settings_from(&[("PORT", "eighty"), ("MAX_TOKENS", "-1")]).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.completions.max_tokens, 512);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let err = settings_from(&[("AI_BACKEND", "genie")]).unwrap_err();
        assert!(err.to_string().contains("genie"));
    }
}
