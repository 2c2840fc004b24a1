//! HTTP implementation of the run API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use runwatch_core::{ApiError, InputSubmission, PendingInput, RunApi, RunSummary};
use serde::Deserialize;
use serde_json::Value;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";
const LANGUAGE_HEADER: &str = "Language";

/// Connection settings of the HTTP API client.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    pub server_url: String,
    pub access_token: String,
    pub language: String,
    pub timeout: Duration,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl HttpApiConfig {
    #[must_use]
    pub fn new(server_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            access_token: access_token.into(),
            language: "EN".to_string(),
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
        }
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    msg: Value,
    #[serde(default)]
    duration: Value,
    #[serde(default)]
    data: Value,
}

/// Run API over HTTP.
pub struct HttpRunApi {
    client: Client,
    config: HttpApiConfig,
}

impl HttpRunApi {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.server_url.trim_end_matches('/'), path)
    }

    /// Send one request and return the `data` member of the envelope.
    ///
    /// # Errors
    /// Returns error on transport failure, an HTTP status outside the
    /// success and redirect ranges, or an unreadable body.
    pub async fn query(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(LANGUAGE_HEADER, &self.config.language)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(ACCESS_TOKEN_HEADER, &self.config.access_token);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        tracing::debug!("{}", self.curl_line(&method, &url, body));

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        let envelope = parsed
            .as_ref()
            .and_then(|v| Envelope::deserialize(v).ok())
            .unwrap_or_default();

        tracing::debug!(
            "{method} {url} {status} in {}",
            value_text(&envelope.duration)
        );
        tracing::debug!("Response Header:");
        for (name, value) in &headers {
            tracing::debug!("  {name}: {}", value.to_str().unwrap_or_default());
        }
        let pretty = parsed
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_else(|| text.clone());
        tracing::debug!("Response Body:\n{pretty}");

        if !(status.is_success() || status.is_redirection()) {
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: value_text(&envelope.status),
                msg: value_text(&envelope.msg),
            });
        }
        if parsed.is_none() {
            return Err(ApiError::Decode(format!("{method} {url} returned non-JSON body")));
        }

        tracing::debug!(
            "{method} {url} [{}] {}",
            value_text(&envelope.status),
            value_text(&envelope.msg)
        );
        Ok(envelope.data)
    }

    fn curl_line(&self, method: &Method, url: &str, body: Option<&Value>) -> String {
        let mut line = format!(
            r#"curl -v -X{method} -H "{LANGUAGE_HEADER}: {}" -H "Content-Type: application/json" -H "{ACCESS_TOKEN_HEADER}: ******""#,
            self.config.language
        );
        if let Some(body) = body {
            line.push_str(&format!(" -d '{body}'"));
        }
        line.push_str(&format!(" '{url}'"));
        line
    }
}

/// Plain text of a loosely typed envelope member.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RunApi for HttpRunApi {
    async fn get_run(&self, run_name: &str) -> Result<RunSummary, ApiError> {
        let data = self
            .query(Method::GET, &format!("api/cicd/run/{run_name}"), None)
            .await?;
        match data.get("run") {
            Some(run) => RunSummary::deserialize(run)
                .map_err(|e| ApiError::Decode(format!("parse run error: {e}"))),
            None => Ok(RunSummary::default()),
        }
    }

    async fn get_pending_input(&self, run_name: &str) -> Result<PendingInput, ApiError> {
        let data = self
            .query(Method::GET, &format!("api/cicd/run/{run_name}/input"), None)
            .await?;
        PendingInput::deserialize(&data)
            .map_err(|e| ApiError::Decode(format!("parse run input error: {e}")))
    }

    async fn submit_input(
        &self,
        run_name: &str,
        submission: &InputSubmission,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(submission)?;
        self.query(
            Method::POST,
            &format!("api/cicd/run/{run_name}/input"),
            Some(&body),
        )
        .await?;
        Ok(())
    }
}
