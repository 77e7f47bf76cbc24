#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Reset,
    Trace,
    Tools,
    Steps(Option<bool>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) const HELP_TEXT: &str = "Available commands:\n  /help                Show this command list\n  /reset               Mulai Sesi Baru: clear history and rebuild the mentor\n  /trace               Show path to the current trace file\n  /tools               List the tools the mentor can use\n  /steps [on|off]      Toggle tool-usage entries, or set them explicitly\nKeys: Enter send, Ctrl-R reset, Ctrl-T toggle tool entries, PgUp/PgDn scroll, Ctrl-C quit";

pub(crate) fn parse_command(line: &str) -> Result<Command, ParseError> {
    if !line.starts_with('/') {
        return Err(ParseError::new("not a command"));
    }

    let trimmed = line.trim();
    let command_text = &trimmed[1..];
    let mut parts = command_text.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_ascii_lowercase();
    if name.is_empty() {
        return Err(ParseError::new("empty command. Try /help"));
    }
    let rest = parts.next().map(str::trim).unwrap_or("");

    match name.as_str() {
        "help" => expect_no_args(rest, Command::Help, "usage: /help"),
        "reset" => expect_no_args(rest, Command::Reset, "usage: /reset"),
        "trace" => expect_no_args(rest, Command::Trace, "usage: /trace"),
        "tools" => expect_no_args(rest, Command::Tools, "usage: /tools"),
        "steps" => parse_steps(rest),
        _ => Err(ParseError::new(format!(
            "unknown command '/{name}'. Try /help"
        ))),
    }
}

pub(crate) fn is_command_line(line: &str) -> bool {
    line.starts_with('/')
}

pub(crate) fn is_quit_line(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit")
}

fn expect_no_args(rest: &str, command: Command, usage: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::new(usage))
    }
}

fn parse_steps(rest: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        return Ok(Command::Steps(None));
    }

    match rest {
        "on" => Ok(Command::Steps(Some(true))),
        "off" => Ok(Command::Steps(Some(false))),
        _ => Err(ParseError::new("usage: /steps [on|off]")),
    }
}
