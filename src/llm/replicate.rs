use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{
    Completion, CompletionRequest, LlmError, LlmProvider, LlmResult, PromptMessage, PromptRole,
};
use crate::http::client::{HttpClient, HttpResponseData};

pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-haiku";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicateOptions {
    pub max_tokens: u32,
    pub poll_interval_ms: u64,
}

impl Default for ReplicateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            poll_interval_ms: 500,
        }
    }
}

/// Hosted model behind Replicate's predictions API.
#[derive(Debug, Clone)]
pub struct ReplicateProvider {
    http: HttpClient,
    api_token: String,
    model: String,
    base_url: String,
    options: ReplicateOptions,
}

impl ReplicateProvider {
    pub fn new(
        http: HttpClient,
        api_token: Option<String>,
        model: String,
        base_url: String,
        options: ReplicateOptions,
    ) -> LlmResult<Self> {
        let api_token = api_token
            .filter(|v| !v.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            http,
            api_token,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/models/{}/predictions", self.base_url, self.model)
    }

    fn build_request(&self, request: &CompletionRequest) -> PredictionRequest {
        PredictionRequest {
            input: PredictionInput {
                prompt: render_transcript(&request.messages),
                system_prompt: request.system_prompt.clone(),
                max_tokens: self.options.max_tokens,
            },
        }
    }

    async fn poll(&self, url: &str) -> LlmResult<Prediction> {
        tokio::time::sleep(Duration::from_millis(self.options.poll_interval_ms)).await;
        let bearer = format!("Bearer {}", self.api_token);
        let resp = self
            .http
            .get(url, &[("Authorization", bearer.as_str())], &[])
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;
        parse_prediction(resp)
    }
}

impl LlmProvider for ReplicateProvider {
    async fn generate(&self, request: CompletionRequest) -> LlmResult<Completion> {
        let payload = self.build_request(&request);
        let bearer = format!("Bearer {}", self.api_token);
        let resp = self
            .http
            .post_json(
                &self.endpoint(),
                &[("Authorization", bearer.as_str()), ("Prefer", "wait")],
                &payload,
            )
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let mut prediction = parse_prediction(resp)?;
        loop {
            match prediction.status.as_str() {
                "succeeded" => {
                    let text = extract_text(prediction.output.as_ref())?;
                    return Ok(Completion { text });
                }
                "failed" | "canceled" | "aborted" => {
                    return Err(LlmError::PredictionFailed {
                        message: error_message(prediction.error.as_ref()),
                        status: prediction.status,
                    });
                }
                _ => {
                    let Some(url) = prediction.urls.and_then(|urls| urls.get) else {
                        return Err(LlmError::Parse(format!(
                            "prediction is {} but has no poll url",
                            prediction.status
                        )));
                    };
                    prediction = self.poll(&url).await?;
                }
            }
        }
    }
}

/// Flattens the conversation into the `Human:`/`Assistant:` transcript the model continues.
pub fn render_transcript(messages: &[PromptMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let speaker = match message.role {
            PromptRole::Human => "Human",
            PromptRole::Ai => "Assistant",
        };
        out.push_str(&format!("{speaker}: {}\n\n", message.text.trim()));
    }
    out.push_str("Assistant:");
    out
}

fn parse_prediction(resp: HttpResponseData) -> LlmResult<Prediction> {
    if !resp.is_success() {
        let body = resp.body.chars().take(400).collect::<String>();
        return Err(LlmError::HttpStatus {
            status: resp.status,
            body,
        });
    }

    serde_json::from_str::<Prediction>(&resp.body).map_err(|err| LlmError::Parse(err.to_string()))
}

fn extract_text(output: Option<&Value>) -> LlmResult<String> {
    let text = match output {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(chunks)) => chunks
            .iter()
            .filter_map(Value::as_str)
            .collect::<String>(),
        _ => String::new(),
    };

    let text = text.trim();
    if text.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

fn error_message(error: Option<&Value>) -> String {
    match error {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => "no details".to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct PredictionRequest {
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    system_prompt: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}
