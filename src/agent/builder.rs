use std::fmt;

use thiserror::Error;

use super::executor::{AgentConfig, AgentExecutor, ReactExecutor};
use crate::http::client::HttpClient;
use crate::llm::provider::LlmError;
use crate::llm::replicate::{ReplicateOptions, ReplicateProvider};
use crate::tools::Toolbox;
use crate::trace::SessionTrace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionConstructionError {
    #[error("cannot start mentor session: {0}")]
    Provider(#[from] LlmError),
}

/// Produces a fresh executor for every session start and reset.
pub trait ExecutorFactory {
    type Executor: AgentExecutor;

    fn build(&self) -> Result<Self::Executor, SessionConstructionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_token: Option<String>,
    pub model: String,
    pub base_url: String,
    pub options: ReplicateOptions,
}

#[derive(Clone)]
pub struct AgentBuilder {
    http: HttpClient,
    toolbox: Toolbox,
    provider: ProviderSettings,
    agent: AgentConfig,
    trace: Option<SessionTrace>,
}

// The API token never reaches debug output.
impl fmt::Debug for AgentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBuilder")
            .field("model", &self.provider.model)
            .field("base_url", &self.provider.base_url)
            .field("has_token", &self.provider.api_token.is_some())
            .field("agent", &self.agent)
            .field("toolbox", &self.toolbox)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl AgentBuilder {
    pub fn new(
        http: HttpClient,
        toolbox: Toolbox,
        provider: ProviderSettings,
        agent: AgentConfig,
    ) -> Self {
        Self {
            http,
            toolbox,
            provider,
            agent,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }
}

impl ExecutorFactory for AgentBuilder {
    type Executor = ReactExecutor<ReplicateProvider>;

    fn build(&self) -> Result<Self::Executor, SessionConstructionError> {
        let provider = ReplicateProvider::new(
            self.http.clone(),
            self.provider.api_token.clone(),
            self.provider.model.clone(),
            self.provider.base_url.clone(),
            self.provider.options,
        )?;

        let executor = ReactExecutor::new(provider, self.toolbox.clone(), self.agent);
        let executor = match &self.trace {
            Some(trace) => {
                trace.log_session(&format!(
                    "built {} for model {}",
                    executor.id(),
                    self.provider.model
                ));
                executor.with_trace(trace.clone())
            }
            None => executor,
        };
        Ok(executor)
    }
}
