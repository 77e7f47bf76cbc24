pub mod turn;

pub use turn::{TurnEvent, TurnReport, TurnState, fallback_message, process_turn};

use crate::agent::{AgentExecutor, ExecutorFactory, ExecutorId, SessionConstructionError};
use crate::trace::SessionTrace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Human,
    Assistant,
    ToolTrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Human(String),
    Assistant(String),
    ToolTrace { tool: String, input: String },
}

impl HistoryEntry {
    pub fn role(&self) -> Role {
        match self {
            HistoryEntry::Human(_) => Role::Human,
            HistoryEntry::Assistant(_) => Role::Assistant,
            HistoryEntry::ToolTrace { .. } => Role::ToolTrace,
        }
    }

    /// Text payload; tool traces render as the tool banner plus its raw input.
    pub fn content(&self) -> String {
        match self {
            HistoryEntry::Human(text) | HistoryEntry::Assistant(text) => text.clone(),
            HistoryEntry::ToolTrace { tool, input } => {
                format!("Menggunakan Alat: {tool}\n{input}")
            }
        }
    }
}

/// Append-only transcript of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    entries: Vec<HistoryEntry>,
}

impl ChatHistory {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Executor and history of one chat session, replaced together on reset.
pub struct ChatSession<F: ExecutorFactory> {
    factory: F,
    executor: F::Executor,
    history: ChatHistory,
    trace: Option<SessionTrace>,
}

impl<F: ExecutorFactory> ChatSession<F> {
    pub fn start(factory: F) -> Result<Self, SessionConstructionError> {
        let executor = factory.build()?;
        Ok(Self {
            factory,
            executor,
            history: ChatHistory::default(),
            trace: None,
        })
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        trace.log_session(&format!("session started with {}", self.executor.id()));
        self.trace = Some(trace);
        self
    }

    /// Discards history and the current executor. On error the old session is kept intact.
    pub fn reset(&mut self) -> Result<(), SessionConstructionError> {
        let executor = self.factory.build()?;
        let previous = std::mem::replace(&mut self.executor, executor);
        self.history.clear();
        if let Some(trace) = &self.trace {
            trace.log_session(&format!(
                "session reset: {} replaced by {}",
                previous.id(),
                self.executor.id()
            ));
        }
        Ok(())
    }

    pub fn executor_id(&self) -> ExecutorId {
        self.executor.id()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn trace(&self) -> Option<&SessionTrace> {
        self.trace.as_ref()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::agent::{
        AgentError, AgentExecutor, AgentStep, ExecutorFactory, ExecutorId,
        SessionConstructionError,
    };
    use crate::llm::provider::LlmError;

    #[derive(Debug, Clone)]
    pub struct ScriptedTurn {
        pub steps: Vec<AgentStep>,
        pub outcome: Result<String, AgentError>,
    }

    impl ScriptedTurn {
        pub fn answer(text: &str) -> Self {
            Self {
                steps: vec![AgentStep::FinalAnswer {
                    output: text.to_string(),
                }],
                outcome: Ok(text.to_string()),
            }
        }

        pub fn tool_then_answer(tool: &str, input: &str, text: &str) -> Self {
            Self {
                steps: vec![
                    AgentStep::ToolInvocation {
                        tool: tool.to_string(),
                        input: input.to_string(),
                    },
                    AgentStep::FinalAnswer {
                        output: text.to_string(),
                    },
                ],
                outcome: Ok(text.to_string()),
            }
        }

        pub fn fails_after_tool(tool: &str, input: &str, err: AgentError) -> Self {
            Self {
                steps: vec![AgentStep::ToolInvocation {
                    tool: tool.to_string(),
                    input: input.to_string(),
                }],
                outcome: Err(err),
            }
        }
    }

    pub struct ScriptedExecutor {
        id: ExecutorId,
        turns: VecDeque<ScriptedTurn>,
    }

    impl AgentExecutor for ScriptedExecutor {
        fn id(&self) -> ExecutorId {
            self.id
        }

        async fn stream<F: FnMut(AgentStep)>(
            &mut self,
            _input: &str,
            on_step: &mut F,
        ) -> Result<String, AgentError> {
            let Some(turn) = self.turns.pop_front() else {
                return Err(AgentError::Model(LlmError::EmptyResponse));
            };
            for step in turn.steps {
                on_step(step);
            }
            turn.outcome
        }
    }

    /// Hands every built executor the same script; builds fail while `fail_builds` is set.
    #[derive(Default)]
    pub struct ScriptedFactory {
        pub turns: Vec<ScriptedTurn>,
        pub fail_builds: RefCell<bool>,
        pub builds: RefCell<usize>,
    }

    impl ScriptedFactory {
        pub fn new(turns: Vec<ScriptedTurn>) -> Self {
            Self {
                turns,
                ..Self::default()
            }
        }
    }

    impl ExecutorFactory for ScriptedFactory {
        type Executor = ScriptedExecutor;

        fn build(&self) -> Result<ScriptedExecutor, SessionConstructionError> {
            if *self.fail_builds.borrow() {
                return Err(SessionConstructionError::Provider(LlmError::MissingApiKey));
            }
            *self.builds.borrow_mut() += 1;
            Ok(ScriptedExecutor {
                id: ExecutorId::next(),
                turns: self.turns.iter().cloned().collect(),
            })
        }
    }
}
