use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

/// Flat `key=value;key=value` tool input, keys and values kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("segment '{segment}' is not a key=value pair")]
pub struct MalformedInput {
    pub segment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing key '{0}'")]
    Missing(String),
    #[error("value '{value}' for key '{key}' is not a number")]
    NotANumber { key: String, value: String },
}

pub fn parse_input(input: &str) -> Result<ParsedInput, MalformedInput> {
    let mut fields = HashMap::new();
    for segment in input.split(';') {
        let mut parts = segment.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MalformedInput {
                segment: segment.to_string(),
            });
        };
        fields.insert(key.to_string(), value.to_string());
    }

    Ok(ParsedInput { fields })
}

impl ParsedInput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn require(&self, key: &str) -> Result<&str, FieldError> {
        self.get(key)
            .ok_or_else(|| FieldError::Missing(key.to_string()))
    }

    /// Reads `key` as a float. Surrounding whitespace in the value is tolerated.
    pub fn number(&self, key: &str) -> Result<f64, FieldError> {
        let raw = self.require(key)?;
        f64::from_str(raw.trim()).map_err(|_| FieldError::NotANumber {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.fields
    }
}
