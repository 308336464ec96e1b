use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant answering questions";

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to completion service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service timed out")]
    Timeout,

    #[error("completion service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse completion response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("completion response contained no choices")]
    NoChoices,

    #[error("completion response contained no message content")]
    EmptyContent,
}

/// Turns a prompt into the text of a grounded completion.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Retrieval settings sent with every request. Fixed unless a caller
/// overrides them when building the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundingOptions {
    pub semantic_configuration: String,
    pub query_type: String,
    pub in_scope: bool,
    pub strictness: u8,
    pub top_n_documents: u32,
}

impl Default for GroundingOptions {
    fn default() -> Self {
        Self {
            semantic_configuration: "default".to_string(),
            query_type: "semantic".to_string(),
            in_scope: true,
            strictness: 2,
            top_n_documents: 9,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: Option<Vec<String>>,
    stream: bool,
    data_sources: [DataSource<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct DataSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: SearchParameters<'a>,
}

#[derive(Debug, Serialize)]
struct SearchParameters<'a> {
    endpoint: &'a str,
    index_name: &'a str,
    semantic_configuration: &'a str,
    query_type: &'a str,
    fields_mapping: serde_json::Map<String, serde_json::Value>,
    in_scope: bool,
    role_information: &'static str,
    filter: Option<String>,
    strictness: u8,
    top_n_documents: u32,
    authentication: SearchAuthentication<'a>,
}

#[derive(Debug, Serialize)]
struct SearchAuthentication<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Azure OpenAI chat completions grounded on an Azure AI Search index.
pub struct AzureSearchGateway {
    config: GatewayConfig,
    grounding: GroundingOptions,
}

impl AzureSearchGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_grounding(config, GroundingOptions::default())
    }

    pub fn with_grounding(config: GatewayConfig, grounding: GroundingOptions) -> Self {
        Self { config, grounding }
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    pub(crate) fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
            stream: false,
            data_sources: [DataSource {
                kind: "azure_search",
                parameters: SearchParameters {
                    endpoint: &self.config.search_endpoint,
                    index_name: &self.config.search_index,
                    semantic_configuration: &self.grounding.semantic_configuration,
                    query_type: &self.grounding.query_type,
                    fields_mapping: serde_json::Map::new(),
                    in_scope: self.grounding.in_scope,
                    role_information: SYSTEM_INSTRUCTION,
                    filter: None,
                    strictness: self.grounding.strictness,
                    top_n_documents: self.grounding.top_n_documents,
                    authentication: SearchAuthentication {
                        kind: "api_key",
                        key: self.config.search_key.expose(),
                    },
                },
            }],
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, GatewayError> {
        let client = reqwest::Client::new();
        let response = client
            .post(self.completions_url())
            .header("api-key", self.config.api_key.expose())
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            return Err(GatewayError::Status { status, body });
        }

        let body = response.text().await?;

        info!(response = %body, "completion response");
        extract_reply(&body)
    }
}

#[async_trait]
impl CompletionGateway for AzureSearchGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(
            deployment = %self.config.deployment,
            index = %self.config.search_index,
            "sending grounded completion request"
        );

        let result = match self.config.timeout {
            Some(limit) => timeout(limit, self.send(prompt))
                .await
                .map_err(|_| GatewayError::Timeout)
                .and_then(|res| res),
            None => self.send(prompt).await,
        };

        if let Err(err) = &result {
            warn!(error = %err, "completion request failed");
        }
        result
    }
}

fn extract_reply(body: &str) -> Result<String, GatewayError> {
    let completion: ChatCompletion = serde_json::from_str(body)?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(GatewayError::NoChoices)?;

    match choice.message.content {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(GatewayError::EmptyContent),
    }
}
