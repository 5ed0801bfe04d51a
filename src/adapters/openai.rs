//! OpenAI-compatible `/chat/completions` client.
//!
//! Maps transport and HTTP failures onto the service error taxonomy:
//! timeouts and connection failures become `UpstreamUnavailable`, 429 becomes the
//! rate-limited flavour of it, any other non-2xx becomes `UpstreamRejected`, and a
//! 2xx body without completion text becomes `UpstreamFormat`.

use crate::config::ServiceConfig;
use crate::domain::ports::{Completion, CompletionClient, CompletionRequest};
use crate::utils::error::{DepromptError, Result, UnavailableKind};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DepromptError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.timeout)
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn classify_transport_error(error: reqwest::Error) -> DepromptError {
    if error.is_timeout() {
        DepromptError::unavailable(UnavailableKind::Timeout, error.to_string())
    } else {
        DepromptError::unavailable(UnavailableKind::Connection, error.to_string())
    }
}

fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(MAX_ERROR_MESSAGE_CHARS).collect(),
    }
}

fn parse_retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Completion> {
        tracing::debug!("Making completion request to: {}", self.url());

        let response = self
            .client
            .post(self.url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        tracing::debug!("Completion API response status: {}", status);

        let body = response.text().await.map_err(classify_transport_error)?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DepromptError::UpstreamUnavailable {
                kind: UnavailableKind::RateLimited,
                message: upstream_error_message(&body),
                retry_after,
            });
        }

        if !status.is_success() {
            return Err(DepromptError::UpstreamRejected {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            DepromptError::format(format!("completion body is not chat-completion JSON: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DepromptError::format("completion has no message content"))?;

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ChatMessage;
    use httpmock::prelude::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![
                ChatMessage::system("improve it"),
                ChatMessage::user("Original Prompt:\nwrite a poem"),
            ],
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "gpt-3.5-turbo", "max_tokens": 1000}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "model": "gpt-3.5-turbo-0125",
                    "choices": [{"message": {"role": "assistant", "content": "hello"}}]
                }));
        });

        let client = OpenAiClient::new(server.url("/v1/"), Duration::from_secs(5)).unwrap();
        let completion = client.complete("sk-test", &request()).await.unwrap();

        api_mock.assert();
        assert_eq!(completion.text, "hello");
        assert_eq!(completion.model, "gpt-3.5-turbo-0125");
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429)
                .header("Retry-After", "12")
                .json_body(serde_json::json!({"error": {"message": "Rate limit reached"}}));
        });

        let client = OpenAiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let err = client.complete("sk-test", &request()).await.unwrap_err();

        assert_eq!(err.unavailable_kind(), Some(UnavailableKind::RateLimited));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
    }

    #[tokio::test]
    async fn test_rejection_uses_upstream_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401)
                .json_body(serde_json::json!({"error": {"message": "Incorrect API key provided"}}));
        });

        let client = OpenAiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let err = client.complete("sk-bad", &request()).await.unwrap_err();

        match err {
            DepromptError::UpstreamRejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_format_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({"choices": []}));
        });

        let client = OpenAiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        let err = client.complete("sk-test", &request()).await.unwrap_err();

        assert!(matches!(err, DepromptError::UpstreamFormat { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // 連到未監聽的埠
        let client = OpenAiClient::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
        let err = client.complete("sk-test", &request()).await.unwrap_err();

        assert_eq!(err.unavailable_kind(), Some(UnavailableKind::Connection));
    }
}
