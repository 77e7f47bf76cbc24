use crate::cli::app::{Action, ChatApp, UiRegions, dispatch, ui_regions};
use crate::cli::theme::Theme;
use crate::session::testing::ScriptedFactory;
use crate::session::{ChatSession, TurnState};
use crate::trace::SessionTrace;
use anyhow::{Result, anyhow};
use crossterm::event::{Event, KeyEvent, MouseEvent};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

pub use crate::session::testing::ScriptedTurn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStateView {
    pub input: String,
    pub show_tool_traces: bool,
    pub turn_state: TurnState,
    pub scroll_back: u16,
    pub history_len: usize,
    pub running: bool,
}

/// Drives the chat screen on a `TestBackend` with a scripted mentor.
pub struct UiHarness {
    terminal: Terminal<TestBackend>,
    app: ChatApp,
    session: ChatSession<ScriptedFactory>,
    running: bool,
}

impl UiHarness {
    pub fn new(width: u16, height: u16, turns: Vec<ScriptedTurn>) -> Result<Self> {
        Self::build(width, height, turns, None)
    }

    pub fn with_trace(
        width: u16,
        height: u16,
        turns: Vec<ScriptedTurn>,
        trace: SessionTrace,
    ) -> Result<Self> {
        Self::build(width, height, turns, Some(trace))
    }

    fn build(
        width: u16,
        height: u16,
        turns: Vec<ScriptedTurn>,
        trace: Option<SessionTrace>,
    ) -> Result<Self> {
        let mut session = ChatSession::start(ScriptedFactory::new(turns))?;
        if let Some(trace) = trace {
            session = session.with_trace(trace);
        }
        let app = ChatApp::new("ui-harness", Theme::new(false), &session);
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        let mut harness = Self {
            terminal,
            app,
            session,
            running: true,
        };
        harness.render()?;
        Ok(harness)
    }

    pub async fn send_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = self.app.handle_event(Event::Key(key));
        self.apply(action).await
    }

    pub fn send_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match self.app.handle_event(Event::Mouse(mouse)) {
            Action::None => self.render(),
            other => Err(anyhow!("mouse event produced unexpected action {other:?}")),
        }
    }

    async fn apply(&mut self, action: Action) -> Result<()> {
        if !self.running {
            return Err(anyhow!("chat loop already stopped"));
        }
        self.running =
            dispatch(&mut self.terminal, &mut self.app, &mut self.session, action).await?;
        self.render()
    }

    pub fn render(&mut self) -> Result<()> {
        let app = &mut self.app;
        self.terminal.draw(|frame| app.render(frame))?;
        Ok(())
    }

    pub fn regions(&self) -> Result<UiRegions> {
        let size = self.terminal.size()?;
        Ok(ui_regions(Rect::new(0, 0, size.width, size.height)))
    }

    pub fn buffer_lines(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn ui_state_view(&self) -> UiStateView {
        UiStateView {
            input: self.app.input().to_string(),
            show_tool_traces: self.app.show_tool_traces(),
            turn_state: self.app.turn_state(),
            scroll_back: self.app.scroll_back(),
            history_len: self.session.history().len(),
            running: self.running,
        }
    }

    /// Makes the next session rebuilds fail, as a missing credential would.
    pub fn fail_next_builds(&mut self, fail: bool) {
        *self.session.factory().fail_builds.borrow_mut() = fail;
    }

    #[cfg(test)]
    pub(crate) fn app(&self) -> &ChatApp {
        &self.app
    }
}
