use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde_json::Value;

pub const REDACTED: &str = "***REDACTED***";

// Replicate is the only authenticated upstream; Open-Meteo takes no key.
const SECRET_FIELDS: [&str; 2] = ["api_token", "token"];

/// Controls how exchanges are rendered into the session trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTraceConfig {
    pub redact_secrets: bool,
    pub max_body_chars: usize,
}

impl Default for HttpTraceConfig {
    fn default() -> Self {
        Self {
            redact_secrets: true,
            max_body_chars: 4_000,
        }
    }
}

impl HttpTraceConfig {
    pub fn with_redaction(redact_secrets: bool) -> Self {
        Self {
            redact_secrets,
            ..Self::default()
        }
    }

    /// The auth scheme stays visible, only the credential is masked.
    pub fn header_for_log(&self, name: &HeaderName, value: &HeaderValue) -> String {
        let Ok(text) = value.to_str() else {
            return "<non-utf8>".to_string();
        };
        if !self.redact_secrets || *name != AUTHORIZATION {
            return text.to_string();
        }

        match text.split_once(' ') {
            Some((scheme, _)) => format!("{scheme} {REDACTED}"),
            None => REDACTED.to_string(),
        }
    }

    pub fn body_for_log(&self, raw: &str) -> String {
        if self.redact_secrets {
            clip(&mask_secret_fields(raw), self.max_body_chars)
        } else {
            clip(raw, self.max_body_chars)
        }
    }
}

// Bodies without secrets keep their original formatting.
fn mask_secret_fields(raw: &str) -> String {
    let Ok(mut json) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };
    if !mask_in_place(&mut json) {
        return raw.to_string();
    }
    serde_json::to_string(&json).unwrap_or_else(|_| raw.to_string())
}

fn mask_in_place(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let mut masked = false;
            for (key, item) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.as_str()) {
                    *item = Value::String(REDACTED.to_string());
                    masked = true;
                } else {
                    masked |= mask_in_place(item);
                }
            }
            masked
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |masked, item| mask_in_place(item) || masked),
        _ => false,
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let dropped = text[cut..].chars().count();
            format!("{}... <truncated {dropped} chars>", &text[..cut])
        }
    }
}
