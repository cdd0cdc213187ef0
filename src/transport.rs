use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::CompletionConfig;
use crate::error::{HeartrestError, Result};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ProviderErrorBody};

const QUOTA_ERROR_CODE: &str = "insufficient_quota";

#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}

/// OpenAI-compatible chat completions client. Single attempt, no retries.
pub struct OpenAiTransport {
    client: Client,
    api_key: String,
    url: String,
}

impl OpenAiTransport {
    pub fn new(cfg: &CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| HeartrestError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            url: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    async fn chat(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HeartrestError::Upstream(format!("Completion request timed out: {e}"))
                } else {
                    HeartrestError::Upstream(format!("Failed to send completion request: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                HeartrestError::Upstream(format!("Failed to parse completion response: {e}"))
            });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(classify_failure(status, &body))
    }
}

/// Maps a non-success provider response onto the error taxonomy
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> HeartrestError {
    let detail = serde_json::from_str::<ProviderErrorBody>(body).ok();
    let quota_exhausted = detail.as_ref().is_some_and(|d| {
        d.error.code.as_deref() == Some(QUOTA_ERROR_CODE)
            || d.error.kind.as_deref() == Some(QUOTA_ERROR_CODE)
    });
    let message = detail
        .map(|d| d.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || quota_exhausted {
        tracing::warn!("Completion provider rate limited ({}): {}", status, message);
        HeartrestError::RateLimited(message)
    } else {
        tracing::error!("Completion provider error ({}): {}", status, message);
        HeartrestError::Upstream(format!("{status}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_429_is_rate_limited() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, HeartrestError::RateLimited(m) if m == "slow down"));
    }

    #[test]
    fn test_insufficient_quota_code_is_rate_limited() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = classify_failure(StatusCode::FORBIDDEN, body);
        assert!(
            matches!(err, HeartrestError::RateLimited(m) if m == "You exceeded your current quota")
        );
    }

    #[test]
    fn test_other_failures_are_upstream() {
        let body = r#"{"error":{"message":"The server had an error","type":"server_error","code":null}}"#;
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(err, HeartrestError::Upstream(_)));

        let err = classify_failure(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, HeartrestError::Upstream(m) if m.contains("bad gateway")));
    }

    /// Accepts connections and never writes a byte back
    async fn silent_listener() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_completion_timeout_is_upstream() {
        let addr = silent_listener().await;
        let mut cfg = crate::config::Config::default().completion;
        cfg.base_url = format!("http://{addr}/v1");
        cfg.timeout_seconds = 1;
        let transport = OpenAiTransport::new(&cfg).unwrap();

        let req = ChatCompletionRequest {
            model: cfg.model.clone(),
            messages: vec![],
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        };
        let err = transport.chat(&req).await.unwrap_err();
        assert!(
            matches!(&err, HeartrestError::Upstream(m) if m.contains("timed out")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_url_is_joined_without_double_slash() {
        let mut cfg = crate::config::Config::default().completion;
        cfg.base_url = "https://example.test/v1/".to_string();
        let transport = OpenAiTransport::new(&cfg).expect("client should build");
        assert_eq!(transport.url, "https://example.test/v1/chat/completions");
    }
}
