use mentor_nusantara::agent::{AgentBuilder, AgentConfig, ProviderSettings};
use mentor_nusantara::http::client::HttpClient;
use mentor_nusantara::http::redact::HttpTraceConfig;
use mentor_nusantara::llm::replicate::ReplicateOptions;
use mentor_nusantara::session::{ChatSession, HistoryEntry, TurnState, process_turn};
use mentor_nusantara::tools::Toolbox;
use mentor_nusantara::tools::weather::WeatherClient;
use mentor_nusantara::trace::SessionTrace;
use serde_json::json;
use std::fs;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "anthropic/claude-3.5-haiku";
const PREDICTIONS_PATH: &str = "/v1/models/anthropic/claude-3.5-haiku/predictions";

fn prediction(output: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({
        "id": "pred-1",
        "status": "succeeded",
        "output": [output],
        "urls": {"get": "http://unused.invalid/predictions/pred-1"}
    }))
}

fn builder(replicate: &MockServer, weather: &MockServer, trace: &SessionTrace) -> AgentBuilder {
    let http = HttpClient::new(reqwest::Client::new(), HttpTraceConfig::default())
        .with_trace(trace.clone());
    let toolbox =
        Toolbox::new(WeatherClient::new(http.clone(), weather.uri())).with_trace(trace.clone());
    let provider = ProviderSettings {
        api_token: Some("r8_secret_token".to_string()),
        model: MODEL.to_string(),
        base_url: replicate.uri(),
        options: ReplicateOptions::default(),
    };
    AgentBuilder::new(http, toolbox, provider, AgentConfig::default()).with_trace(trace.clone())
}

#[tokio::test]
async fn weather_question_runs_tool_then_answers() {
    let replicate = MockServer::start().await;
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_weather": {"temperature": 29.5, "weathercode": 63}
        })))
        .expect(1)
        .mount(&weather)
        .await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS_PATH))
        .and(body_string_contains("TOOL RESPONSE"))
        .respond_with(prediction(
            r#"{"action": "Final Answer", "action_input": "Sedang hujan, jual bakso hangat!"}"#,
        ))
        .with_priority(1)
        .expect(1)
        .mount(&replicate)
        .await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS_PATH))
        .respond_with(prediction(
            "```json\n{\"action\": \"get_weather\", \"action_input\": \"lat=-6.2;lon=106.8\"}\n```",
        ))
        .expect(1)
        .mount(&replicate)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let trace = SessionTrace::create_in_dir("flow", dir.path()).expect("trace");
    let mut session = ChatSession::start(builder(&replicate, &weather, &trace))
        .expect("session")
        .with_trace(trace.clone());

    let mut states = Vec::new();
    let report = process_turn(
        &mut session,
        "Saya di Jakarta, bisnis apa yang cocok hari ini?",
        &mut |event| {
            if let mentor_nusantara::session::TurnEvent::State(state) = event {
                states.push(state);
            }
        },
    )
    .await;

    assert_eq!(report.state, TurnState::Done);
    assert_eq!(report.answer, "Sedang hujan, jual bakso hangat!");
    assert_eq!(report.tool_calls, 1);
    assert_eq!(
        states,
        vec![
            TurnState::AwaitingModel,
            TurnState::StreamingSteps,
            TurnState::Done,
            TurnState::Idle
        ]
    );
    assert_eq!(
        session.history().entries(),
        &[
            HistoryEntry::Human("Saya di Jakarta, bisnis apa yang cocok hari ini?".to_string()),
            HistoryEntry::ToolTrace {
                tool: "get_weather".to_string(),
                input: "lat=-6.2;lon=106.8".to_string(),
            },
            HistoryEntry::Assistant("Sedang hujan, jual bakso hangat!".to_string()),
        ]
    );

    let requests = replicate.received_requests().await.expect("recorded requests");
    let second = String::from_utf8_lossy(&requests[1].body).to_string();
    assert!(second.contains("temperature"), "observation missing: {second}");

    let logged = fs::read_to_string(trace.file_path()).expect("read trace");
    assert!(logged.contains("[chat.tool  ] get_weather"));
    assert!(logged.contains("***REDACTED***"));
    assert!(!logged.contains("r8_secret_token"));
}

#[tokio::test]
async fn provider_failure_becomes_fallback_answer() {
    let replicate = MockServer::start().await;
    let weather = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICTIONS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&replicate)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let trace = SessionTrace::create_in_dir("fail", dir.path()).expect("trace");
    let mut session =
        ChatSession::start(builder(&replicate, &weather, &trace)).expect("session");

    let report = process_turn(&mut session, "Halo mentor", &mut |_| {}).await;

    assert_eq!(report.state, TurnState::Failed);
    assert!(
        report
            .answer
            .starts_with("Maaf, mentor sedang pusing (Error: "),
        "got: {}",
        report.answer
    );
    assert!(report.answer.contains("401"));
    assert_eq!(session.history().len(), 2);
}

#[test]
fn session_start_fails_without_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace = SessionTrace::create_in_dir("no-token", dir.path()).expect("trace");
    let http = HttpClient::new(reqwest::Client::new(), HttpTraceConfig::default());
    let toolbox = Toolbox::new(WeatherClient::new(http.clone(), "http://127.0.0.1:9"));
    let provider = ProviderSettings {
        api_token: Some("   ".to_string()),
        model: MODEL.to_string(),
        base_url: "http://127.0.0.1:9".to_string(),
        options: ReplicateOptions::default(),
    };
    let builder =
        AgentBuilder::new(http, toolbox, provider, AgentConfig::default()).with_trace(trace);

    let err = ChatSession::start(builder).err().expect("start must fail");
    assert_eq!(
        err.to_string(),
        "cannot start mentor session: missing REPLICATE_API_TOKEN"
    );
}
