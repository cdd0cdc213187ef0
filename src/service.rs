use std::sync::Arc;

use crate::config::{Config, ReplyMode};
use crate::error::{HeartrestError, Result};
use crate::heuristic::KeywordResponder;
use crate::models::StructuredReply;
use crate::prompt::PromptBuilder;
use crate::search::{GoogleSearch, SearchProvider};
use crate::sectionizer::{KeywordSectionizer, Sectionizer};
use crate::synth::{CompletionSynth, Synthesizer};
use crate::transport::{OpenAiTransport, Transport};

pub const MISSING_MESSAGE: &str = "메시지가 필요합니다.";

/// Raw answer plus its three-part split
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: String,
    pub reply: StructuredReply,
}

/// Turns a user story into a structured reply. Each call is independent.
pub struct ChatService {
    mode: ReplyMode,
    prompt: PromptBuilder,
    synth: Arc<dyn Synthesizer>,
    sectionizer: Arc<dyn Sectionizer>,
    responder: KeywordResponder,
}

impl ChatService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(OpenAiTransport::new(&cfg.completion)?);
        let synth = Arc::new(CompletionSynth::new(
            transport as Arc<dyn Transport>,
            &cfg.completion,
        ));

        let search: Option<Arc<dyn SearchProvider>> = if cfg.search.credentials().is_some() {
            Some(Arc::new(GoogleSearch::new(&cfg.search)?))
        } else {
            None
        };
        let prompt = PromptBuilder::new(search, cfg.search.max_results);

        Ok(Self::from_parts(
            cfg.reply.mode,
            prompt,
            synth,
            Arc::new(KeywordSectionizer),
        ))
    }

    pub fn from_parts(
        mode: ReplyMode,
        prompt: PromptBuilder,
        synth: Arc<dyn Synthesizer>,
        sectionizer: Arc<dyn Sectionizer>,
    ) -> Self {
        Self {
            mode,
            prompt,
            synth,
            sectionizer,
            responder: KeywordResponder,
        }
    }

    pub async fn handle(&self, message: &str) -> Result<ChatOutcome> {
        if message.trim().is_empty() {
            return Err(HeartrestError::InvalidInput(MISSING_MESSAGE.to_string()));
        }

        if self.mode == ReplyMode::Heuristic {
            let reply = self.responder.respond(message);
            let answer = format!("{}\n\n{}\n\n{}", reply.praise, reply.comfort, reply.solution);
            return Ok(ChatOutcome { answer, reply });
        }

        let request = self.prompt.build(message).await;
        let answer = self.synth.complete(&request).await.inspect_err(|e| {
            tracing::error!("Completion failed: {}", e);
        })?;
        let reply = self.sectionizer.split(&answer);

        Ok(ChatOutcome { answer, reply })
    }
}
