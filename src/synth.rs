use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CompletionConfig;
use crate::error::Result;
use crate::models::{ChatCompletionRequest, ChatMessage, CompletionRequest};
use crate::transport::Transport;

/// Answer used when the provider returns no usable content
pub const EMPTY_ANSWER_FALLBACK: &str = "죄송합니다. 답변을 생성할 수 없습니다.";

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<String>;
}

pub struct CompletionSynth {
    tx: Arc<dyn Transport>,
    model: String,
    max_tokens: i32,
    temperature: f32,
}

impl CompletionSynth {
    pub fn new(tx: Arc<dyn Transport>, cfg: &CompletionConfig) -> Self {
        Self {
            tx,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

#[async_trait]
impl Synthesizer for CompletionSynth {
    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        tracing::info!(
            "Requesting completion from {} ({} chars of user content)",
            self.model,
            req.user_content.chars().count()
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: req.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: req.user_content.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.tx.chat(&request).await?;
        tracing::info!(
            "Completion received from {} with {} choice(s)",
            self.model,
            response.choices.len()
        );

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        match answer {
            Some(content) => Ok(content),
            None => {
                tracing::warn!("Completion provider returned no content, using fallback answer");
                Ok(EMPTY_ANSWER_FALLBACK.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::HeartrestError;
    use crate::models::{ChatCompletionResponse, Choice, ResponseMessage};
    use std::sync::Mutex;

    // Mock Transport for testing
    struct MockTransport {
        responses: Mutex<Vec<ChatCompletionResponse>>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl MockTransport {
        fn new(responses: Vec<ChatCompletionResponse>) -> Self {
            MockTransport {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn chat(&self, req: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
            self.seen.lock().unwrap().push(req.clone());
            let mut responses = self.responses.lock().unwrap();
            if let Some(response) = responses.pop() {
                Ok(response)
            } else {
                Err(HeartrestError::Internal("No more mock responses".to_string()))
            }
        }
    }

    fn answer(content: Option<&str>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: content.map(str::to_string),
                },
            }],
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "system".to_string(),
            user_content: "오늘 회사에서 힘들었어요".to_string(),
        }
    }

    #[tokio::test]
    async fn test_complete_sends_fixed_parameters() {
        let transport = Arc::new(MockTransport::new(vec![answer(Some("정말 잘했어요."))]));
        let synth = CompletionSynth::new(transport.clone(), &Config::default().completion);

        let result = synth.complete(&request()).await.unwrap();
        assert_eq!(result, "정말 잘했어요.");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4o");
        assert_eq!(seen[0].max_tokens, 1500);
        assert_eq!(seen[0].messages[0].role, "system");
        assert_eq!(seen[0].messages[0].content, "system");
        assert_eq!(seen[0].messages[1].role, "user");
        assert_eq!(seen[0].messages[1].content, "오늘 회사에서 힘들었어요");
    }

    #[tokio::test]
    async fn test_empty_content_uses_fallback() {
        let transport = Arc::new(MockTransport::new(vec![answer(None)]));
        let synth = CompletionSynth::new(transport, &Config::default().completion);
        assert_eq!(synth.complete(&request()).await.unwrap(), EMPTY_ANSWER_FALLBACK);

        let transport = Arc::new(MockTransport::new(vec![ChatCompletionResponse {
            choices: vec![],
        }]));
        let synth = CompletionSynth::new(transport, &Config::default().completion);
        assert_eq!(synth.complete(&request()).await.unwrap(), EMPTY_ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let transport = Arc::new(MockTransport::new(vec![]));
        let synth = CompletionSynth::new(transport, &Config::default().completion);
        let err = synth.complete(&request()).await.unwrap_err();
        assert!(matches!(err, HeartrestError::Internal(_)));
    }
}
