use serde_json::Value;
use thiserror::Error;

use super::ToolError;
use super::calc::format_float;
use super::input::parse_input;
use crate::http::client::HttpClient;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.open-meteo.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("weather service answered HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("weather service returned invalid JSON: {0}")]
    Parse(String),
    #[error("weather response has no 'current_weather' object")]
    MissingCurrentWeather,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: HttpClient,
    base_url: String,
}

impl WeatherClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }

    /// `lat=<number>;lon=<number>` -> compact JSON of the `current_weather` object.
    pub async fn get_weather(&self, input: &str) -> Result<String, ToolError> {
        let parsed = parse_input(input)?;
        let lat = parsed.number("lat")?;
        let lon = parsed.number("lon")?;
        let current = self.current_weather(lat, lon).await?;
        Ok(current.to_string())
    }

    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<Value, WeatherError> {
        let query = [
            ("latitude", format_float(lat)),
            ("longitude", format_float(lon)),
            ("current_weather", "true".to_string()),
        ];
        let response = self
            .http
            .get(&self.endpoint(), &[], &query)
            .await
            .map_err(|err| WeatherError::Transport(err.to_string()))?;

        if !response.is_success() {
            let body = response.body.chars().take(400).collect::<String>();
            return Err(WeatherError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let mut payload = serde_json::from_str::<Value>(&response.body)
            .map_err(|err| WeatherError::Parse(err.to_string()))?;
        match payload.get_mut("current_weather").map(Value::take) {
            Some(current @ Value::Object(_)) => Ok(current),
            _ => Err(WeatherError::MissingCurrentWeather),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WeatherClient, WeatherError};
    use crate::http::client::HttpClient;
    use crate::http::redact::HttpTraceConfig;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WeatherClient {
        WeatherClient::new(
            HttpClient::new(Client::new(), HttpTraceConfig::default()),
            format!("{}/", server.uri()),
        )
    }

    #[tokio::test]
    async fn returns_current_weather_object_as_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "-6.2"))
            .and(query_param("longitude", "106.8"))
            .and(query_param("current_weather", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": -6.25,
                "current_weather": {"temperature": 31.4, "weathercode": 61, "windspeed": 5.2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .get_weather("lat=-6.2;lon=106.8")
            .await
            .expect("weather");

        assert_eq!(
            text,
            r#"{"temperature":31.4,"weathercode":61,"windspeed":5.2}"#
        );
    }

    #[tokio::test]
    async fn integral_coordinates_are_sent_with_decimal_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("latitude", "0.0"))
            .and(query_param("longitude", "110.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"current_weather": {"is_day": 1}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .get_weather("lat=0;lon=110")
            .await
            .expect("weather");
        assert_eq!(text, r#"{"is_day":1}"#);
    }

    #[tokio::test]
    async fn missing_current_weather_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hourly": {}})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current_weather(-6.2, 106.8)
            .await
            .expect_err("missing field");
        assert_eq!(err, WeatherError::MissingCurrentWeather);
    }

    #[tokio::test]
    async fn error_status_and_empty_body_are_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": true, "reason": "Latitude must be in range"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current_weather(-99.0, 106.8)
            .await
            .expect_err("bad status");
        match err {
            WeatherError::HttpStatus { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Latitude must be in range"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }

        let empty = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&empty)
            .await;
        let err = client_for(&empty)
            .current_weather(-6.2, 106.8)
            .await
            .expect_err("empty body");
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_weather("jakarta").await.expect_err("malformed");
        assert!(err.to_string().contains("not a key=value pair"));

        let err = client.get_weather("lat=-6.2").await.expect_err("missing lon");
        assert_eq!(err.to_string(), "missing key 'lon'");
    }
}
