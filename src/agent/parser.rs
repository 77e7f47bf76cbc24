use serde_json::{Map, Value};
use thiserror::Error;

use super::prompt::FINAL_ANSWER_ACTION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    ToolCall { tool: String, input: String },
    Final(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no JSON object found in model reply")]
    NoJson,
    #[error("reply JSON is not an object")]
    NotAnObject,
    #[error("reply JSON has no '{0}' field")]
    MissingField(&'static str),
    #[error("'action' must be a string")]
    ActionNotString,
}

/// Reads one `{"action", "action_input"}` blob out of a model reply.
pub fn parse_action(reply: &str) -> Result<AgentAction, ParseError> {
    let value = extract_json(reply).ok_or(ParseError::NoJson)?;
    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject);
    };

    let action = match map.get("action") {
        Some(Value::String(action)) => action.trim().to_string(),
        Some(_) => return Err(ParseError::ActionNotString),
        None => return Err(ParseError::MissingField("action")),
    };
    let input = action_input(&map)?;

    if action == FINAL_ANSWER_ACTION {
        Ok(AgentAction::Final(input))
    } else {
        Ok(AgentAction::ToolCall {
            tool: action,
            input,
        })
    }
}

fn action_input(map: &Map<String, Value>) -> Result<String, ParseError> {
    match map.get("action_input") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) => Ok(String::new()),
        Some(other) => Ok(other.to_string()),
        None => Err(ParseError::MissingField("action_input")),
    }
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fenced.trim())
    {
        return Some(value);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Some(value);
    }

    None
}

// Models often wrap the blob in prose plus a ```json fence.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let after = after
        .strip_prefix("json")
        .or_else(|| after.strip_prefix("JSON"))
        .unwrap_or(after);
    let end = after.find("```")?;
    Some(&after[..end])
}
