use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ChatFlow, ChatInput, ChatOutput, QaFlow, QaInput, QaOutput};
use crate::config::FlowServerSettings;
use crate::error::FlowError;

#[derive(Serialize)]
struct FlowRequest<'a, I> {
    data: &'a I,
}

#[derive(Deserialize)]
struct FlowResponse<O> {
    result: Option<O>,
}

/// Client for a flow server that exposes each flow as `POST /{flow}`.
pub struct FlowServerClient {
    server_url: String,
    qa_flow: String,
    chat_flow: String,
    client: Client,
}

impl FlowServerClient {
    pub fn new(settings: &FlowServerSettings) -> Self {
        info!("Using flow server at: {}", settings.url);
        Self {
            server_url: settings.url.trim_end_matches('/').to_string(),
            qa_flow: settings.qa_flow.clone(),
            chat_flow: settings.chat_flow.clone(),
            client: Client::new(),
        }
    }

    pub fn flow_url(&self, flow: &str) -> String {
        format!("{}/{}", self.server_url, flow)
    }

    async fn run_flow<I, O>(&self, flow: &str, input: &I) -> Result<O, FlowError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let url = self.flow_url(flow);
        info!("Running flow {}", flow);

        let response = self
            .client
            .post(&url)
            .json(&FlowRequest { data: input })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(FlowError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!("Flow {} response: {}", flow, body);
        parse_flow_body(&body)
    }
}

fn parse_flow_body<O: DeserializeOwned>(body: &str) -> Result<O, FlowError> {
    let parsed: FlowResponse<O> =
        serde_json::from_str(body).map_err(|e| FlowError::Malformed(e.to_string()))?;
    parsed
        .result
        .ok_or_else(|| FlowError::Malformed("response has no `result`".to_string()))
}

#[async_trait]
impl QaFlow for FlowServerClient {
    async fn ask(&self, input: QaInput) -> Result<QaOutput, FlowError> {
        self.run_flow(&self.qa_flow, &input).await
    }
}

#[async_trait]
impl ChatFlow for FlowServerClient {
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, FlowError> {
        self.run_flow(&self.chat_flow, &input).await
    }
}
