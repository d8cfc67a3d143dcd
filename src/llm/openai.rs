//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{CompletionClient, ToolCompletionClient};
use super::types::{Choice, Message, ToolCall};
use crate::function::Definition;

/// Default endpoint when none is configured.
pub const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default wait before the first retry; doubled for every later one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
}

#[derive(Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
///
/// Transport errors, `429 Too Many Requests` and `5xx` responses are retried
/// up to `max_retries` more times with exponential backoff. Other error
/// statuses and undecodable bodies fail at once.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
    max_retries: u32,
    retry_delay: Duration,
    timeout: Option<Duration>,
}

/// Failure of a single attempt.
struct AttemptError {
    error: anyhow::Error,
    retryable: bool,
}

impl AttemptError {
    fn retryable(error: anyhow::Error) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn fatal(error: anyhow::Error) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

/// Statuses worth another attempt.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

impl OpenAiClient {
    /// Create a client for `url` using `model`.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            model: model.into(),
            api_key: None,
            temperature: 1.0,
            max_retries: 1,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Additional attempts after the first failure.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait before the first retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a client from configuration, with environment overrides.
    #[cfg(feature = "config")]
    pub fn from_config(
        config: &crate::config::LlmConfig,
        env: &crate::config::EnvironmentLoader,
    ) -> Self {
        let url = env.base_url().unwrap_or(&config.url);
        let model = env.model().unwrap_or(&config.model);

        let mut client = Self::new(url, model)
            .with_temperature(config.temperature)
            .with_max_retries(config.max_retries);
        if let Some(secs) = config.timeout_seconds {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        if let Some(key) = env.api_key() {
            client = client.with_api_key(key);
        }
        client
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, messages: &[Message], tools: &[Definition]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools: tools.iter().map(Definition::to_openai_function).collect(),
            temperature: self.temperature,
            stream: false,
        };
        serde_json::to_string(&request).context("Failed to serialize chat request")
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }

    async fn send(&self, body: &str) -> std::result::Result<String, AttemptError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body.to_string());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .context("HTTP request failed")
            .map_err(AttemptError::retryable)?;
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error = anyhow::anyhow!("API error {}: {}", status, error_body);
            return Err(if is_retryable_status(status) {
                AttemptError::retryable(error)
            } else {
                AttemptError::fatal(error)
            });
        }
        response
            .text()
            .await
            .context("Failed to read response body")
            .map_err(AttemptError::retryable)
    }

    async fn request(&self, messages: &[Message], tools: &[Definition]) -> Result<Vec<Choice>> {
        let body = self.build_request(messages, tools)?;
        let attempts = 1 + self.max_retries;
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff(attempt - 1)).await;
            }
            debug!(url = %self.url, attempt, "POST chat completion");
            match self.send(&body).await {
                Ok(text) => return parse_response(&text),
                Err(AttemptError {
                    error,
                    retryable: false,
                }) => {
                    warn!(attempt, error = %error, "chat completion failed, not retrying");
                    return Err(error.context("Chat completion failed"));
                }
                Err(AttemptError { error, .. }) => {
                    warn!(attempt, error = %error, "chat completion attempt failed");
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| anyhow::anyhow!("no attempt was made"));
        Err(error.context(format!("Chat completion failed after {} attempts", attempts)))
    }
}

/// Decode a chat-completions response body into choices.
fn parse_response(body: &str) -> Result<Vec<Choice>> {
    let response: ChatResponse =
        serde_json::from_str(body).context("Failed to decode chat response")?;

    Ok(response
        .choices
        .into_iter()
        .map(|c| Choice {
            content: c.message.content.unwrap_or_default(),
            tool_calls: c
                .message
                .tool_calls
                .into_iter()
                .map(|tc| ToolCall::new(tc.function.name, tc.function.arguments))
                .collect(),
        })
        .collect())
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<Vec<Choice>> {
        self.request(messages, &[]).await
    }
}

#[async_trait::async_trait]
impl ToolCompletionClient for OpenAiClient {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[Definition],
    ) -> Result<Vec<Choice>> {
        self.request(messages, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_build_request_with_tools() {
        let client = OpenAiClient::new("http://localhost/v1/chat/completions", "local")
            .with_temperature(0.2);
        let defs = vec![Definition::without_parameters("no", "Nothing fits")];
        let body = client
            .build_request(&[Message::user("hello")], &defs)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["model"], "local");
        assert_eq!(value["stream"], false);
        assert_eq!(value["temperature"], 0.2);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "no");
    }

    #[test]
    fn test_build_request_without_tools() {
        let client = OpenAiClient::new(DEFAULT_URL, DEFAULT_MODEL);
        let body = client.build_request(&[Message::system("x")], &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "greet(\"Ann\",30)"}},
                {"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "greet", "arguments": "{\"name\":\"Ann\"}"}
                    }]
                }}
            ]
        })
        .to_string();

        let choices = parse_response(&body).unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].content, "greet(\"Ann\",30)");
        assert!(choices[1].content.is_empty());
        assert_eq!(choices[1].tool_calls[0], ToolCall::new("greet", "{\"name\":\"Ann\"}"));
    }

    #[test]
    fn test_parse_response_invalid() {
        assert!(parse_response("not json").is_err());
        assert!(parse_response("{}").unwrap().is_empty());
    }

    /// Read one request, headers and `content-length` body, so closing the
    /// socket afterwards does not reset the connection.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= head_end + 4 + length {
                return;
            }
        }
    }

    /// Serve `status` with an empty body on every connection, counting requests.
    async fn serve_status(status: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (url, hits)
    }

    #[test]
    fn test_retryable_statuses() {
        use reqwest::StatusCode;

        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let client = OpenAiClient::new(DEFAULT_URL, DEFAULT_MODEL);
        assert_eq!(client.backoff(1), Duration::from_millis(500));
        assert_eq!(client.backoff(2), Duration::from_secs(1));
        assert_eq!(client.backoff(3), Duration::from_secs(2));
        assert_eq!(client.backoff(40), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, hits) = serve_status("401 Unauthorized").await;
        let client = OpenAiClient::new(url, "m")
            .with_max_retries(3)
            .with_retry_delay(Duration::from_millis(1));

        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(format!("{:#}", err).contains("401"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (url, hits) = serve_status("503 Service Unavailable").await;
        let client = OpenAiClient::new(url, "m")
            .with_max_retries(2)
            .with_retry_delay(Duration::from_millis(1));

        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
        assert!(format!("{:#}", err).contains("503"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_exhausts_retries() {
        let client = OpenAiClient::new("http://127.0.0.1:9/v1/chat/completions", "m")
            .with_max_retries(1)
            .with_retry_delay(Duration::from_millis(1))
            .with_timeout(Duration::from_millis(500));
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("after 2 attempts"));
    }
}
