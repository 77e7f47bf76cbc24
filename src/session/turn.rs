use std::fmt;

use super::{ChatSession, HistoryEntry};
use crate::agent::{AgentExecutor, AgentStep, ExecutorFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingModel,
    StreamingSteps,
    Done,
    Failed,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TurnState::Idle => "idle",
            TurnState::AwaitingModel => "awaiting-model",
            TurnState::StreamingSteps => "streaming-steps",
            TurnState::Done => "done",
            TurnState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent<'a> {
    State(TurnState),
    Message(&'a HistoryEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub state: TurnState,
    pub answer: String,
    pub tool_calls: usize,
}

pub fn fallback_message(err: &dyn fmt::Display) -> String {
    format!("Maaf, mentor sedang pusing (Error: {err})")
}

/// Runs one user message through the executor. Always ends with exactly one
/// assistant entry, the fallback text when the executor fails.
pub async fn process_turn<F, E>(
    session: &mut ChatSession<F>,
    input: &str,
    on_event: &mut E,
) -> TurnReport
where
    F: ExecutorFactory,
    E: FnMut(TurnEvent<'_>),
{
    let ChatSession {
        executor,
        history,
        trace,
        ..
    } = session;

    let set_state = |state: TurnState, on_event: &mut E| {
        if let Some(trace) = trace.as_ref() {
            trace.log_turn_state(&state.to_string());
        }
        on_event(TurnEvent::State(state));
    };

    set_state(TurnState::AwaitingModel, on_event);
    if let Some(trace) = trace.as_ref() {
        trace.log_user_input(input);
    }
    on_event(TurnEvent::Message(
        history.push(HistoryEntry::Human(input.to_string())),
    ));

    set_state(TurnState::StreamingSteps, on_event);
    let mut tool_calls = 0usize;
    let result = executor
        .stream(input, &mut |step| {
            if let AgentStep::ToolInvocation { tool, input } = step {
                tool_calls += 1;
                if let Some(trace) = trace.as_ref() {
                    trace.log_tool_trace(&tool, &input);
                }
                on_event(TurnEvent::Message(
                    history.push(HistoryEntry::ToolTrace { tool, input }),
                ));
            }
        })
        .await;

    let (state, answer) = match result {
        Ok(answer) => (TurnState::Done, answer),
        Err(err) => (TurnState::Failed, fallback_message(&err)),
    };

    if let Some(trace) = trace.as_ref() {
        trace.log_assistant_output(&answer);
    }
    on_event(TurnEvent::Message(
        history.push(HistoryEntry::Assistant(answer.clone())),
    ));
    set_state(state, on_event);
    set_state(TurnState::Idle, on_event);

    TurnReport {
        state,
        answer,
        tool_calls,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{TurnEvent, TurnState, process_turn};
    use crate::agent::AgentError;
    use crate::llm::provider::LlmError;
    use crate::session::testing::{ScriptedFactory, ScriptedTurn};
    use crate::session::{ChatSession, HistoryEntry, Role};
    use crate::trace::SessionTrace;

    #[derive(Debug, PartialEq, Eq)]
    enum Seen {
        State(TurnState),
        Message(Role),
    }

    fn record(seen: &mut Vec<Seen>) -> impl FnMut(TurnEvent<'_>) + '_ {
        move |event| {
            seen.push(match event {
                TurnEvent::State(state) => Seen::State(state),
                TurnEvent::Message(entry) => Seen::Message(entry.role()),
            })
        }
    }

    #[tokio::test]
    async fn plain_answer_adds_exactly_two_entries() {
        let mut session =
            ChatSession::start(ScriptedFactory::new(vec![ScriptedTurn::answer("Halo, Nak!")]))
                .expect("session");

        let mut seen = Vec::new();
        let report = process_turn(&mut session, "halo mentor", &mut record(&mut seen)).await;

        assert_eq!(report.state, TurnState::Done);
        assert_eq!(report.answer, "Halo, Nak!");
        assert_eq!(report.tool_calls, 0);
        assert_eq!(
            session.history().entries(),
            &[
                HistoryEntry::Human("halo mentor".to_string()),
                HistoryEntry::Assistant("Halo, Nak!".to_string()),
            ]
        );
        assert_eq!(
            seen,
            vec![
                Seen::State(TurnState::AwaitingModel),
                Seen::Message(Role::Human),
                Seen::State(TurnState::StreamingSteps),
                Seen::Message(Role::Assistant),
                Seen::State(TurnState::Done),
                Seen::State(TurnState::Idle),
            ]
        );
    }

    #[tokio::test]
    async fn tool_invocations_are_surfaced_and_recorded_in_order() {
        let mut session = ChatSession::start(ScriptedFactory::new(vec![
            ScriptedTurn::tool_then_answer("multiply", "a=10000;b=50", "Untungnya 500 ribu."),
        ]))
        .expect("session");

        let mut seen = Vec::new();
        let report = process_turn(&mut session, "hitung", &mut record(&mut seen)).await;

        assert_eq!(report.tool_calls, 1);
        assert_eq!(session.history().len(), 3);
        assert_eq!(
            session.history().entries()[1],
            HistoryEntry::ToolTrace {
                tool: "multiply".to_string(),
                input: "a=10000;b=50".to_string(),
            }
        );
        assert_eq!(seen[3], Seen::Message(Role::ToolTrace));
        assert_eq!(seen[4], Seen::Message(Role::Assistant));
    }

    #[tokio::test]
    async fn failure_mid_stream_yields_single_fallback_answer() {
        let dir = tempdir().expect("tempdir");
        let trace = SessionTrace::create_in_dir("turn", dir.path()).expect("trace");
        let mut session = ChatSession::start(ScriptedFactory::new(vec![
            ScriptedTurn::fails_after_tool(
                "get_weather",
                "lat=-6.2;lon=106.8",
                AgentError::Model(LlmError::Transport("connection reset".to_string())),
            ),
            ScriptedTurn::answer("Sudah pulih."),
        ]))
        .expect("session")
        .with_trace(trace.clone());

        let report = process_turn(&mut session, "cuaca?", &mut |_| {}).await;

        assert_eq!(report.state, TurnState::Failed);
        assert_eq!(
            report.answer,
            "Maaf, mentor sedang pusing (Error: provider transport error: connection reset)"
        );
        let assistants = session
            .history()
            .entries()
            .iter()
            .filter(|entry| entry.role() == Role::Assistant)
            .count();
        assert_eq!(assistants, 1);
        assert_eq!(session.history().len(), 3);

        let next = process_turn(&mut session, "lagi", &mut |_| {}).await;
        assert_eq!(next.state, TurnState::Done);
        assert_eq!(session.history().len(), 5);

        let logged = fs::read_to_string(trace.file_path()).expect("read trace");
        assert!(logged.contains("[turn.state ] failed"));
        assert!(logged.contains("[chat.tool  ]"));
        assert!(logged.contains("[chat.in    ] cuaca?"));
    }
}
