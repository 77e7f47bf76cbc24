use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ThemeToken {
    Title,
    Subtitle,
    UserPrompt,
    UserText,
    AssistantPrompt,
    AssistantText,
    ToolTrace,
    SystemInfo,
    SystemError,
    Status,
    Waiting,
    InputBlock,
    Placeholder,
}

/// Fixed palette; `NO_COLOR` turns it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Theme {
    enabled: bool,
}

impl Theme {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) fn from_env() -> Self {
        Self::new(color_enabled(std::env::var_os("NO_COLOR").as_deref()))
    }

    pub(crate) fn style(&self, token: ThemeToken) -> Style {
        if !self.enabled {
            return disabled_style(token);
        }

        match token {
            ThemeToken::Title => Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
            ThemeToken::Subtitle => Style::default()
                .fg(Color::Rgb(138, 138, 138))
                .add_modifier(Modifier::ITALIC),
            ThemeToken::UserPrompt => Style::default()
                .fg(Color::Rgb(122, 162, 247))
                .add_modifier(Modifier::BOLD),
            ThemeToken::UserText => Style::default().fg(Color::White),
            ThemeToken::AssistantPrompt => Style::default()
                .fg(Color::Rgb(219, 75, 75))
                .add_modifier(Modifier::BOLD),
            ThemeToken::AssistantText => Style::default().fg(Color::Rgb(230, 220, 200)),
            ThemeToken::ToolTrace => Style::default()
                .fg(Color::Rgb(51, 51, 51))
                .bg(Color::Rgb(255, 248, 225)),
            ThemeToken::SystemInfo | ThemeToken::Status => {
                Style::default().fg(Color::Rgb(86, 95, 137))
            }
            ThemeToken::SystemError => Style::default()
                .fg(Color::Rgb(247, 118, 142))
                .add_modifier(Modifier::BOLD),
            ThemeToken::Waiting => Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
            ThemeToken::InputBlock => Style::default().bg(Color::Rgb(22, 22, 30)).fg(Color::White),
            ThemeToken::Placeholder => Style::default()
                .bg(Color::Rgb(22, 22, 30))
                .fg(Color::Rgb(100, 100, 110)),
        }
    }
}

fn color_enabled(no_color: Option<&std::ffi::OsStr>) -> bool {
    no_color.is_none_or(|value| value.is_empty())
}

fn disabled_style(token: ThemeToken) -> Style {
    match token {
        ThemeToken::Title | ThemeToken::UserPrompt | ThemeToken::AssistantPrompt => {
            Style::default().add_modifier(Modifier::BOLD)
        }
        _ => Style::default(),
    }
}
