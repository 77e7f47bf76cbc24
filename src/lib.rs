pub mod agent;
pub mod cli;
pub mod config;
pub mod http;
pub mod llm;
pub mod session;
pub mod tools;
pub mod trace;

use agent::{AgentBuilder, ProviderSettings};
use anyhow::{Result, anyhow};
use cli::{CliArgs, run_tui};
use config::AppConfig;
use http::client::HttpClient;
use http::redact::HttpTraceConfig;
use session::ChatSession;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tools::Toolbox;
use tools::weather::WeatherClient;
use trace::SessionTrace;

pub async fn run(args: CliArgs) -> Result<()> {
    let config = if let Some(path) = args.config.as_deref() {
        AppConfig::load_with_path(Some(path))?
    } else {
        AppConfig::load()?
    };
    let session_id = generate_session_id();
    let trace = SessionTrace::create(&session_id)?;

    let builder = agent_builder(&config, &trace)?;
    let session = ChatSession::start(builder)
        .map_err(|err| {
            trace.log_session(&format!("startup failed: {err}"));
            anyhow!(err)
        })?
        .with_trace(trace);

    run_tui(session, &session_id).await
}

fn agent_builder(config: &AppConfig, trace: &SessionTrace) -> Result<AgentBuilder> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http.request_timeout_ms))
        .build()
        .map_err(|err| anyhow!("Failed to build HTTP client: {err}"))?;
    let http = HttpClient::new(
        client,
        HttpTraceConfig::with_redaction(config.http.redact_trace),
    )
    .with_trace(trace.clone());

    let weather = WeatherClient::new(http.clone(), config.weather_base_url.clone());
    let toolbox = Toolbox::new(weather).with_trace(trace.clone());
    let provider = ProviderSettings {
        api_token: config.replicate_api_token.clone(),
        model: config.model.clone(),
        base_url: config.replicate_base_url.clone(),
        options: config.replicate,
    };

    Ok(AgentBuilder::new(http, toolbox, provider, config.agent).with_trace(trace.clone()))
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
