use crate::cli::theme::{Theme, ThemeToken};
use crate::session::HistoryEntry;
use ratatui::text::{Line, Span};

const WELCOME_TEXT: &str =
    "Selamat datang! Ceritakan bisnismu, lokasimu, atau tanyakan sejarah. /help untuk bantuan.";
const TOOL_BAR: &str = "  ┃ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SystemKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimelineEntry {
    User(String),
    Assistant(String),
    ToolTrace { tool: String, input: String },
    System { kind: SystemKind, text: String },
}

/// Render-side mirror of the chat history plus local system notes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub(crate) fn push_history_entry(&mut self, entry: &HistoryEntry) {
        self.entries.push(match entry {
            HistoryEntry::Human(text) => TimelineEntry::User(text.clone()),
            HistoryEntry::Assistant(text) => TimelineEntry::Assistant(text.clone()),
            HistoryEntry::ToolTrace { tool, input } => TimelineEntry::ToolTrace {
                tool: tool.clone(),
                input: input.clone(),
            },
        });
    }

    pub(crate) fn push_system(&mut self, kind: SystemKind, text: &str) {
        self.entries.push(TimelineEntry::System {
            kind,
            text: text.to_string(),
        });
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn render_lines(&self, theme: &Theme, show_tool_traces: bool) -> Vec<Line<'static>> {
        if self.entries.is_empty() {
            return vec![Line::from(Span::styled(
                WELCOME_TEXT,
                theme.style(ThemeToken::SystemInfo),
            ))];
        }

        let mut lines = Vec::new();
        for entry in &self.entries {
            match entry {
                TimelineEntry::User(text) => {
                    push_bubble(
                        &mut lines,
                        theme,
                        "kamu> ",
                        ThemeToken::UserPrompt,
                        text,
                        ThemeToken::UserText,
                    );
                }
                TimelineEntry::Assistant(text) => {
                    push_bubble(
                        &mut lines,
                        theme,
                        "mentor> ",
                        ThemeToken::AssistantPrompt,
                        text,
                        ThemeToken::AssistantText,
                    );
                    lines.push(Line::from(""));
                }
                TimelineEntry::ToolTrace { tool, input } if show_tool_traces => {
                    let style = theme.style(ThemeToken::ToolTrace);
                    lines.push(Line::from(Span::styled(
                        format!("{TOOL_BAR}Menggunakan Alat: {tool}"),
                        style,
                    )));
                    for line in split_lines(input) {
                        lines.push(Line::from(Span::styled(format!("{TOOL_BAR}{line}"), style)));
                    }
                }
                TimelineEntry::ToolTrace { .. } => {}
                TimelineEntry::System { kind, text } => {
                    let token = match kind {
                        SystemKind::Info => ThemeToken::SystemInfo,
                        SystemKind::Error => ThemeToken::SystemError,
                    };
                    for line in split_lines(text) {
                        lines.push(Line::from(Span::styled(line.to_string(), theme.style(token))));
                    }
                }
            }
        }

        lines
    }
}

fn push_bubble(
    lines: &mut Vec<Line<'static>>,
    theme: &Theme,
    prompt: &'static str,
    prompt_token: ThemeToken,
    text: &str,
    text_token: ThemeToken,
) {
    let indent = " ".repeat(prompt.len());
    for (index, line) in split_lines(text).into_iter().enumerate() {
        let lead = if index == 0 {
            Span::styled(prompt, theme.style(prompt_token))
        } else {
            Span::raw(indent.clone())
        };
        lines.push(Line::from(vec![
            lead,
            Span::styled(line.to_string(), theme.style(text_token)),
        ]));
    }
}

// Empty text still gets one row so the prompt is visible.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![""];
    }

    text.lines().collect()
}
