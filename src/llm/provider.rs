use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub text: String,
}

impl PromptMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Human,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Ai,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("missing REPLICATE_API_TOKEN")]
    MissingApiKey,
    #[error("provider request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("provider transport error: {0}")]
    Transport(String),
    #[error("provider parse error: {0}")]
    Parse(String),
    #[error("prediction {status}: {message}")]
    PredictionFailed { status: String, message: String },
    #[error("provider returned empty response text")]
    EmptyResponse,
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

pub trait LlmProvider {
    fn generate(
        &self,
        request: CompletionRequest,
    ) -> impl std::future::Future<Output = LlmResult<Completion>> + Send;
}
