use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::AgentConfig;
use crate::llm::replicate::{DEFAULT_MODEL, DEFAULT_REPLICATE_BASE_URL, ReplicateOptions};
use crate::tools::weather::DEFAULT_WEATHER_BASE_URL;

const CONFIG_DIR_NAME: &str = "mentor-nusantara";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub config_is_explicit: bool,
    pub replicate_api_token: Option<String>,
    pub model: String,
    pub replicate_base_url: String,
    pub weather_base_url: String,
    pub agent: AgentConfig,
    pub replicate: ReplicateOptions,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout_ms: u64,
    pub redact_trace: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            redact_trace: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    replicate_api_token: Option<String>,
    model: Option<String>,
    replicate_base_url: Option<String>,
    weather_base_url: Option<String>,
    agent: Option<RawAgentConfig>,
    replicate: Option<RawReplicateConfig>,
    http: Option<RawHttpConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAgentConfig {
    max_iterations: Option<i64>,
    step_timeout_ms: Option<i64>,
    total_timeout_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReplicateConfig {
    max_tokens: Option<i64>,
    poll_interval_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHttpConfig {
    request_timeout_ms: Option<i64>,
    redact_trace: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let config_is_explicit = explicit_path.is_some();
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => discover_config_path()?,
        };
        if config_is_explicit && !config_path.is_file() {
            bail!(
                "Failed to load config {}: file does not exist",
                config_path.display()
            );
        }
        let file_config = load_file_config(&config_path)?;

        // Real environment variables always win over .env entries.
        dotenvy::dotenv().ok();

        let file = file_config.as_ref();
        let file_string = |pick: fn(&RawFileConfig) -> Option<&String>| {
            file.and_then(pick)
                .and_then(|value| non_empty(value).map(ToOwned::to_owned))
        };

        let agent = validate_agent(file.and_then(|cfg| cfg.agent.as_ref()), &config_path)?;
        let replicate =
            validate_replicate(file.and_then(|cfg| cfg.replicate.as_ref()), &config_path)?;
        let http = validate_http(file.and_then(|cfg| cfg.http.as_ref()), &config_path)?;

        Ok(Self {
            replicate_api_token: env_non_empty("REPLICATE_API_TOKEN")
                .or_else(|| file_string(|cfg| cfg.replicate_api_token.as_ref())),
            model: env_non_empty("MENTOR_MODEL")
                .or_else(|| file_string(|cfg| cfg.model.as_ref()))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            replicate_base_url: env_non_empty("REPLICATE_BASE_URL")
                .or_else(|| file_string(|cfg| cfg.replicate_base_url.as_ref()))
                .unwrap_or_else(|| DEFAULT_REPLICATE_BASE_URL.to_string()),
            weather_base_url: env_non_empty("WEATHER_BASE_URL")
                .or_else(|| file_string(|cfg| cfg.weather_base_url.as_ref()))
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            agent,
            replicate,
            http,
            config_path,
            config_is_explicit,
        })
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text)
        .map(Some)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", config_path.display()))
}

fn validate_agent(raw: Option<&RawAgentConfig>, config_path: &Path) -> Result<AgentConfig> {
    let mut config = AgentConfig::default();
    let Some(raw) = raw else {
        return Ok(config);
    };

    if let Some(value) = raw.max_iterations {
        if value < 1 {
            return Err(config_error(
                config_path,
                "agent.max_iterations",
                "must be at least 1",
            ));
        }
        config.max_iterations = usize::try_from(value)
            .map_err(|_| config_error(config_path, "agent.max_iterations", "value is too large"))?;
    }
    if let Some(value) = raw.step_timeout_ms {
        config.step_timeout_ms = positive_millis(value, config_path, "agent.step_timeout_ms")?;
    }
    if let Some(value) = raw.total_timeout_ms {
        config.total_timeout_ms = positive_millis(value, config_path, "agent.total_timeout_ms")?;
    }

    Ok(config)
}

fn validate_replicate(
    raw: Option<&RawReplicateConfig>,
    config_path: &Path,
) -> Result<ReplicateOptions> {
    let mut options = ReplicateOptions::default();
    let Some(raw) = raw else {
        return Ok(options);
    };

    if let Some(value) = raw.max_tokens {
        options.max_tokens = u32::try_from(value)
            .ok()
            .filter(|tokens| *tokens > 0)
            .ok_or_else(|| {
                config_error(
                    config_path,
                    "replicate.max_tokens",
                    "must be a positive integer",
                )
            })?;
    }
    if let Some(value) = raw.poll_interval_ms {
        options.poll_interval_ms =
            positive_millis(value, config_path, "replicate.poll_interval_ms")?;
    }

    Ok(options)
}

fn validate_http(raw: Option<&RawHttpConfig>, config_path: &Path) -> Result<HttpSettings> {
    let mut settings = HttpSettings::default();
    let Some(raw) = raw else {
        return Ok(settings);
    };

    if let Some(value) = raw.request_timeout_ms {
        settings.request_timeout_ms = positive_millis(value, config_path, "http.request_timeout_ms")?;
    }
    if let Some(redact) = raw.redact_trace {
        settings.redact_trace = redact;
    }

    Ok(settings)
}

fn positive_millis(value: i64, config_path: &Path, key_path: &str) -> Result<u64> {
    u64::try_from(value)
        .ok()
        .filter(|millis| *millis > 0)
        .ok_or_else(|| config_error(config_path, key_path, "must be greater than 0"))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|value| non_empty(&value).map(ToOwned::to_owned))
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn config_error(config_path: &Path, key_path: &str, reason: &str) -> anyhow::Error {
    anyhow!(
        "Failed to load config {}: {key_path}: {reason}",
        config_path.display()
    )
}
