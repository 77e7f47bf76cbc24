use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::timeout;

use super::memory::ConversationMemory;
use super::parser::{AgentAction, parse_action};
use super::prompt;
use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider, PromptMessage};
use crate::tools::Toolbox;
use crate::trace::SessionTrace;

pub const FORCED_STOP_MESSAGE: &str = "Mentor berhenti karena batas iterasi atau waktu tercapai.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub step_timeout_ms: u64,
    pub total_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            step_timeout_ms: 60_000,
            total_timeout_ms: 180_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutorId(u64);

impl ExecutorId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executor-{}", self.0)
    }
}

/// What the executor yields while it works through one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    ToolInvocation { tool: String, input: String },
    FinalAnswer { output: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] LlmError),
    #[error("model call exceeded the {0} ms step timeout")]
    StepTimeout(u64),
    #[error("turn exceeded the {0} ms total timeout")]
    TotalTimeout(u64),
}

pub trait AgentExecutor {
    fn id(&self) -> ExecutorId;

    /// Runs one user turn to completion, reporting each step as it happens.
    fn stream<F: FnMut(AgentStep)>(
        &mut self,
        input: &str,
        on_step: &mut F,
    ) -> impl Future<Output = Result<String, AgentError>>;
}

pub struct ReactExecutor<P> {
    id: ExecutorId,
    provider: P,
    toolbox: Toolbox,
    memory: ConversationMemory,
    config: AgentConfig,
    system_prompt: String,
    trace: Option<SessionTrace>,
}

impl<P: LlmProvider> ReactExecutor<P> {
    pub fn new(provider: P, toolbox: Toolbox, config: AgentConfig) -> Self {
        Self {
            id: ExecutorId::next(),
            provider,
            toolbox,
            memory: ConversationMemory::new(),
            config,
            system_prompt: prompt::system_prompt(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    fn log_step(&self, text: &str) {
        if let Some(trace) = &self.trace {
            trace.log_agent_step(text);
        }
    }

    fn finish<F: FnMut(AgentStep)>(
        &mut self,
        input: &str,
        output: String,
        on_step: &mut F,
    ) -> String {
        on_step(AgentStep::FinalAnswer {
            output: output.clone(),
        });
        self.memory.save_turn(input, &output);
        output
    }

    async fn call_model(
        &self,
        messages: Vec<PromptMessage>,
        deadline: Instant,
    ) -> Result<String, AgentError> {
        let now = Instant::now();
        if now >= deadline {
            return Err(AgentError::TotalTimeout(self.config.total_timeout_ms));
        }

        let remaining = deadline.duration_since(now);
        let per_step = Duration::from_millis(self.config.step_timeout_ms);
        let budget = per_step.min(remaining);
        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages,
        };

        match timeout(budget, self.provider.generate(request)).await {
            Ok(Ok(completion)) => Ok(completion.text),
            Ok(Err(err)) => Err(err.into()),
            Err(_) if budget < per_step => {
                Err(AgentError::TotalTimeout(self.config.total_timeout_ms))
            }
            Err(_) => Err(AgentError::StepTimeout(self.config.step_timeout_ms)),
        }
    }
}

impl<P: LlmProvider> AgentExecutor for ReactExecutor<P> {
    fn id(&self) -> ExecutorId {
        self.id
    }

    async fn stream<F: FnMut(AgentStep)>(
        &mut self,
        input: &str,
        on_step: &mut F,
    ) -> Result<String, AgentError> {
        let deadline = Instant::now() + Duration::from_millis(self.config.total_timeout_ms);
        // Intermediate replies and observations of this turn only; memory keeps the rest.
        let mut scratchpad: Vec<PromptMessage> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            self.log_step(&format!(
                "{} iteration {iteration}/{}",
                self.id, self.config.max_iterations
            ));

            let mut messages = self.memory.messages().to_vec();
            messages.push(PromptMessage::human(prompt::user_turn(input)));
            messages.extend(scratchpad.iter().cloned());
            let reply = self.call_model(messages, deadline).await?;

            match parse_action(&reply) {
                Ok(AgentAction::Final(output)) => {
                    self.log_step(&format!("final answer after {iteration} iteration(s)"));
                    return Ok(self.finish(input, output, on_step));
                }
                Ok(AgentAction::ToolCall { tool, input: tool_input }) => {
                    on_step(AgentStep::ToolInvocation {
                        tool: tool.clone(),
                        input: tool_input.clone(),
                    });
                    let observation = self.toolbox.invoke_named(&tool, &tool_input).await;
                    scratchpad.push(PromptMessage::ai(reply));
                    scratchpad.push(PromptMessage::human(prompt::tool_response(&observation)));
                }
                Err(err) => {
                    if let Some(trace) = &self.trace {
                        trace.log_agent_recovery(&reply, &err.to_string());
                    }
                    scratchpad.push(PromptMessage::ai(reply));
                    scratchpad.push(PromptMessage::human(prompt::format_reminder(
                        &err.to_string(),
                    )));
                }
            }
        }

        self.log_step("iteration limit reached, forcing stop");
        Ok(self.finish(input, FORCED_STOP_MESSAGE.to_string(), on_step))
    }
}
