use crate::agent::ExecutorFactory;
use crate::cli::commands::{Command, HELP_TEXT, is_command_line, is_quit_line, parse_command};
use crate::cli::terminal::{self, EventSource, TerminalEvents};
use crate::cli::theme::{Theme, ThemeToken};
use crate::cli::timeline::{SystemKind, Timeline};
use crate::session::{ChatSession, TurnEvent, TurnState, process_turn};
use crate::tools::Tool;
use crate::trace::SessionTrace;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::{Frame, Terminal};

pub(crate) const TITLE: &str = "💼 Mentor Bisnis & Sejarah AI";
pub(crate) const SUBTITLE: &str =
    "Konsultasi bisnis berbasis lokasi dengan kearifan lokal sejarah Indonesia.";
pub(crate) const PLACEHOLDER: &str = "Ceritakan masalah bisnismu atau tanyakan sejarah...";
pub(crate) const WAITING_TEXT: &str = "Sedang meracik strategi bisnis...";

const INPUT_PROMPT: &str = "> ";
const MOUSE_SCROLL_LINES: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiRegions {
    pub header: Rect,
    pub timeline: Rect,
    pub status: Rect,
    pub input: Rect,
}

pub fn ui_regions(area: Rect) -> UiRegions {
    let [header, timeline, status, input] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);
    UiRegions {
        header,
        timeline,
        status,
        input,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Submit(String),
    Reset,
    Quit,
}

/// Everything the screen shows that is not owned by the session.
pub(crate) struct ChatApp {
    session_id: String,
    executor_label: String,
    theme: Theme,
    trace: Option<SessionTrace>,
    timeline: Timeline,
    input: String,
    show_tool_traces: bool,
    turn_state: TurnState,
    scroll_back: u16,
    max_scroll: u16,
    timeline_height: u16,
}

impl ChatApp {
    pub(crate) fn new<F: ExecutorFactory>(
        session_id: &str,
        theme: Theme,
        session: &ChatSession<F>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            executor_label: session.executor_id().to_string(),
            theme,
            trace: session.trace().cloned(),
            timeline: Timeline::new(),
            input: String::new(),
            show_tool_traces: true,
            turn_state: TurnState::Idle,
            scroll_back: 0,
            max_scroll: 0,
            timeline_height: 0,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn show_tool_traces(&self) -> bool {
        self.show_tool_traces
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn turn_state(&self) -> TurnState {
        self.turn_state
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    #[cfg(test)]
    pub(crate) fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn in_flight(&self) -> bool {
        matches!(
            self.turn_state,
            TurnState::AwaitingModel | TurnState::StreamingSteps
        )
    }

    pub(crate) fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.scroll_up(MOUSE_SCROLL_LINES),
                    MouseEventKind::ScrollDown => self.scroll_down(MOUSE_SCROLL_LINES),
                    _ => {}
                }
                Action::None
            }
            Event::Paste(text) => {
                self.input.push_str(&text.replace(['\r', '\n'], " "));
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Action::Quit,
            KeyCode::Char('r') if ctrl => Action::Reset,
            KeyCode::Char('t') if ctrl => {
                self.set_tool_traces(!self.show_tool_traces);
                Action::None
            }
            KeyCode::Char(ch) if !ctrl => {
                self.input.push(ch);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.input.clear();
                Action::None
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                if line.trim().is_empty() {
                    Action::None
                } else {
                    Action::Submit(line)
                }
            }
            KeyCode::PageUp => {
                self.scroll_up(self.page_size());
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll_down(self.page_size());
                Action::None
            }
            _ => Action::None,
        }
    }

    fn page_size(&self) -> u16 {
        self.timeline_height.saturating_sub(1).max(1)
    }

    fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines).min(self.max_scroll);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    fn set_tool_traces(&mut self, show: bool) {
        self.show_tool_traces = show;
        let state = if show { "on" } else { "off" };
        self.log_ui(&format!("steps: {state}"));
    }

    fn log_ui(&self, text: &str) {
        if let Some(trace) = &self.trace {
            trace.log_session(text);
        }
    }

    fn push_info(&mut self, text: &str) {
        self.log_ui(text);
        self.timeline.push_system(SystemKind::Info, text);
        self.scroll_back = 0;
    }

    fn push_error(&mut self, text: &str) {
        self.log_ui(text);
        self.timeline.push_system(SystemKind::Error, text);
        self.scroll_back = 0;
    }

    pub(crate) fn apply_turn_event(&mut self, event: TurnEvent<'_>) {
        match event {
            TurnEvent::State(state) => self.turn_state = state,
            TurnEvent::Message(entry) => {
                self.timeline.push_history_entry(entry);
                self.scroll_back = 0;
            }
        }
    }

    pub(crate) fn reset_session<F: ExecutorFactory>(&mut self, session: &mut ChatSession<F>) {
        match session.reset() {
            Ok(()) => {
                self.timeline.clear();
                self.scroll_back = 0;
                self.executor_label = session.executor_id().to_string();
            }
            Err(err) => self.push_error(&format!("Gagal memulai sesi baru: {err}")),
        }
    }

    fn run_command<F: ExecutorFactory>(&mut self, line: &str, session: &mut ChatSession<F>) {
        self.log_ui(&format!("command {}", line.trim()));
        match parse_command(line) {
            Ok(Command::Help) => self.push_info(HELP_TEXT),
            Ok(Command::Reset) => self.reset_session(session),
            Ok(Command::Trace) => {
                let text = match &self.trace {
                    Some(trace) => format!("trace: {}", trace.file_path().display()),
                    None => "trace: disabled".to_string(),
                };
                self.push_info(&text);
            }
            Ok(Command::Tools) => {
                let listing = Tool::ALL
                    .iter()
                    .map(|tool| format!("{}: {}", tool.name(), tool.description()))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push_info(&listing);
            }
            Ok(Command::Steps(state)) => {
                let show = state.unwrap_or(!self.show_tool_traces);
                self.set_tool_traces(show);
                let label = if show { "on" } else { "off" };
                self.timeline
                    .push_system(SystemKind::Info, &format!("steps: {label}"));
            }
            Err(err) => self.push_error(err.message()),
        }
    }

    pub(crate) fn render(&mut self, frame: &mut Frame<'_>) {
        let regions = ui_regions(frame.area());

        let header = vec![
            Line::styled(TITLE, self.theme.style(ThemeToken::Title)),
            Line::styled(SUBTITLE, self.theme.style(ThemeToken::Subtitle)),
        ];
        frame.render_widget(Paragraph::new(header), regions.header);

        self.render_timeline(frame, regions.timeline);
        frame.render_widget(Paragraph::new(self.status_line()), regions.status);
        self.render_input(frame, regions.input);
    }

    fn render_timeline(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let lines = self
            .timeline
            .render_lines(&self.theme, self.show_tool_traces);
        let rows = wrapped_rows(&lines, area.width);
        self.timeline_height = area.height;
        self.max_scroll =
            u16::try_from(rows.saturating_sub(usize::from(area.height))).unwrap_or(u16::MAX);
        self.scroll_back = self.scroll_back.min(self.max_scroll);

        let top = self.max_scroll - self.scroll_back;
        let timeline = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((top, 0));
        frame.render_widget(timeline, area);
    }

    fn status_line(&self) -> Line<'static> {
        let status = self.theme.style(ThemeToken::Status);
        let session = Span::styled(format!("sesi {}", self.session_id), status);
        if self.in_flight() {
            return Line::from(vec![
                session,
                Span::styled(" | ", status),
                Span::styled(WAITING_TEXT, self.theme.style(ThemeToken::Waiting)),
            ]);
        }

        let traces = if self.show_tool_traces {
            "tampil"
        } else {
            "sembunyi"
        };
        Line::from(vec![
            session,
            Span::styled(
                format!(
                    " | {} | alat: {traces} | Ctrl-R Mulai Sesi Baru | /help",
                    self.executor_label
                ),
                status,
            ),
        ])
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = self.theme.style(ThemeToken::InputBlock);
        let available = usize::from(area.width).saturating_sub(INPUT_PROMPT.len() + 1);
        let visible = visible_tail(&self.input, available);
        let body = if self.input.is_empty() {
            Span::styled(PLACEHOLDER, self.theme.style(ThemeToken::Placeholder))
        } else {
            Span::styled(visible.to_string(), block)
        };
        let line = Line::from(vec![Span::styled(INPUT_PROMPT, block), body]);
        frame.render_widget(Paragraph::new(line).style(block), area);

        let offset = INPUT_PROMPT.len() + visible.chars().count();
        let x = area
            .x
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
            .min(area.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, area.y));
    }
}

// Estimate of wrapped height; assumes each line wraps at exactly `width` cells.
fn wrapped_rows(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

fn visible_tail(input: &str, max_chars: usize) -> &str {
    let count = input.chars().count();
    if count <= max_chars {
        return input;
    }
    let start = input
        .char_indices()
        .nth(count - max_chars)
        .map_or(input.len(), |(index, _)| index);
    &input[start..]
}

/// Applies one action. Returns `false` once the user asked to leave.
pub(crate) async fn dispatch<B, F>(
    terminal: &mut Terminal<B>,
    app: &mut ChatApp,
    session: &mut ChatSession<F>,
    action: Action,
) -> Result<bool>
where
    B: Backend,
    F: ExecutorFactory,
{
    match action {
        Action::None => {}
        Action::Quit => return Ok(false),
        Action::Reset => app.reset_session(session),
        Action::Submit(line) => {
            if is_quit_line(&line) {
                return Ok(false);
            }
            if is_command_line(&line) {
                app.run_command(&line, session);
            } else {
                run_turn(terminal, app, session, &line).await?;
            }
        }
    }
    Ok(true)
}

async fn run_turn<B, F>(
    terminal: &mut Terminal<B>,
    app: &mut ChatApp,
    session: &mut ChatSession<F>,
    line: &str,
) -> Result<()>
where
    B: Backend,
    F: ExecutorFactory,
{
    let mut draw_error = None;
    process_turn(session, line, &mut |event| {
        app.apply_turn_event(event);
        if draw_error.is_some() {
            return;
        }
        if let Err(err) = terminal.draw(|frame| app.render(frame)) {
            draw_error = Some(err);
        }
    })
    .await;

    match draw_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

pub(crate) async fn run_chat_loop<B, F, S>(
    terminal: &mut Terminal<B>,
    app: &mut ChatApp,
    session: &mut ChatSession<F>,
    events: &mut S,
) -> Result<()>
where
    B: Backend,
    F: ExecutorFactory,
    S: EventSource,
{
    loop {
        terminal.draw(|frame| app.render(frame))?;
        let action = app.handle_event(events.next_event()?);
        if !dispatch(terminal, app, session, action).await? {
            return Ok(());
        }
    }
}

/// Takes over the terminal until the user quits. The terminal is restored on every exit path.
pub async fn run_tui<F: ExecutorFactory>(
    mut session: ChatSession<F>,
    session_id: &str,
) -> Result<()> {
    let mut app = ChatApp::new(session_id, Theme::from_env(), &session);
    let mut tui = terminal::init_terminal()?;
    let result = run_chat_loop(&mut tui, &mut app, &mut session, &mut TerminalEvents).await;
    let restored = terminal::restore_terminal(&mut tui);
    result.and(restored.map_err(Into::into))
}
