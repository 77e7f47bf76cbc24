use super::redact::HttpTraceConfig;
use crate::trace::SessionTrace;
use reqwest::{Client, Request, RequestBuilder};
use serde::Serialize;
use std::fmt;

/// `reqwest` wrapper that records every exchange in the session trace.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    config: HttpTraceConfig,
    trace: Option<SessionTrace>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn new(inner: Client, config: HttpTraceConfig) -> Self {
        Self {
            inner,
            config,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        payload: &T,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let body_json = serde_json::to_string(payload)
            .unwrap_or_else(|err| format!("{{\"_serialization_error\":\"{err}\"}}"));

        let builder = with_headers(self.inner.post(url), headers).json(payload);
        self.execute(builder, &body_json).await
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> Result<HttpResponseData, reqwest::Error> {
        let builder = with_headers(self.inner.get(url), headers).query(query);
        self.execute(builder, "").await
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        body_for_log: &str,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let request = builder.build()?;
        if let Some(trace) = &self.trace {
            trace.log_http_request(&request_log_lines(self.config, &request, body_for_log));
        }

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                if let Some(trace) = &self.trace {
                    trace.log_http_error(&err.to_string());
                }
                return Err(err);
            }
        };
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                if let Some(trace) = &self.trace {
                    trace.log_http_error(&err.to_string());
                }
                return Err(err);
            }
        };

        if let Some(trace) = &self.trace {
            trace.log_http_response(&response_log_lines(self.config, status, &headers, &body));
        }

        Ok(HttpResponseData { status, body })
    }
}

fn with_headers(mut builder: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
}

fn request_log_lines(config: HttpTraceConfig, request: &Request, body: &str) -> Vec<String> {
    let body = config.body_for_log(body);

    let mut lines = Vec::new();
    lines.push(format!("> {} {}", request.method(), request.url()));
    for (name, value) in request.headers() {
        lines.push(format!("> {name}: {}", config.header_for_log(name, value)));
    }
    lines.push(">".to_string());
    append_body_lines(&mut lines, '>', &body);
    lines
}

fn response_log_lines(
    config: HttpTraceConfig,
    status: u16,
    headers: &reqwest::header::HeaderMap,
    body: &str,
) -> Vec<String> {
    let body = config.body_for_log(body);

    let mut lines = Vec::new();
    lines.push(format!("< HTTP {status}"));
    for (name, value) in headers {
        lines.push(format!("< {name}: {}", config.header_for_log(name, value)));
    }
    lines.push("<".to_string());
    append_body_lines(&mut lines, '<', &body);
    lines
}

fn append_body_lines(lines: &mut Vec<String>, direction: char, body: &str) {
    if body.is_empty() {
        lines.push(format!("{direction} <empty body>"));
        return;
    }

    for line in body.lines() {
        lines.push(format!("{direction} {line}"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl HttpResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
