//! Response pipeline orchestrator
//!
//! Linear state machine over the two capabilities: generate → parse →
//! synthesize per segment, with a fallback policy. Failures on the main path
//! degrade to a *successful* apologetic reply; only a failure of the fallback
//! synthesis itself is a genuine pipeline failure.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use avatar_agent_config::PromptLibrary;
use avatar_agent_core::{
    LanguageModel, PipelineError, PromptContext, ReplySet, SpeechSynthesizer,
};

use crate::parser::ReplyParser;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Overall deadline for the generate/parse/synthesize path
    pub response_deadline: Duration,
    /// Whether both vendor credentials are configured
    pub credentials_present: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            response_deadline: Duration::from_secs(30),
            credentials_present: true,
        }
    }
}

/// Terminal pipeline failure: the main path and the fallback synthesis both
/// failed. Still carries the apologetic text so the user-visible channel is
/// never empty.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PipelineFailure {
    /// The stage error from the main path
    pub error: PipelineError,
    /// Best-effort apologetic reply, audio absent
    pub reply: ReplySet,
}

/// Response pipeline orchestrator
///
/// Request-scoped and sequential: each stage completes before the next
/// starts, and per-segment synthesis runs in reply order. No state crosses
/// requests.
pub struct ResponsePipeline {
    llm: Arc<dyn LanguageModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    parser: ReplyParser,
    prompts: PromptLibrary,
    config: PipelineConfig,
}

impl ResponsePipeline {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        prompts: PromptLibrary,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            synthesizer,
            parser: ReplyParser::new(),
            prompts,
            config,
        }
    }

    /// Produce the avatar's reply for one utterance.
    ///
    /// Missing credentials and empty utterances short-circuit to canned
    /// replies without touching any remote capability. Otherwise the main
    /// path runs under the response deadline and degrades to the spoken
    /// fallback on any stage failure.
    pub async fn respond(&self, utterance: &str) -> Result<ReplySet, PipelineFailure> {
        if utterance.trim().is_empty() {
            return Ok(self.prompts.greeting.to_reply_set());
        }

        if !self.config.credentials_present {
            tracing::warn!("vendor credentials missing, serving configuration reply");
            return Ok(self.prompts.missing_keys.to_reply_set());
        }

        let deadline = self.config.response_deadline;
        let outcome = match tokio::time::timeout(deadline, self.main_path(utterance)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(deadline.as_millis() as u64)),
        };

        match outcome {
            Ok(reply) => Ok(reply),
            Err(error) => self.fallback(error).await,
        }
    }

    /// Generate → parse → synthesize, aborting on the first failure.
    ///
    /// Synthesis failure for any segment discards the whole set; a partially
    /// voiced reply is never returned.
    async fn main_path(&self, utterance: &str) -> Result<ReplySet, PipelineError> {
        let context = PromptContext::new(self.prompts.system.build(), utterance);

        let raw = self.llm.generate(&context).await?;
        tracing::debug!(chars = raw.len(), "model returned completion");

        let mut reply = self.parser.parse(&raw)?;

        for (index, segment) in reply.iter_mut().enumerate() {
            let audio = self.synthesizer.synthesize(&segment.text, index).await?;
            segment.audio = Some(audio);
        }

        Ok(reply)
    }

    /// Degrade to the fixed apologetic reply, still spoken if possible.
    async fn fallback(&self, error: PipelineError) -> Result<ReplySet, PipelineFailure> {
        tracing::error!(error = %error, "main response path failed, serving fallback");

        let mut reply = self.prompts.fallback.to_reply_set();
        match self
            .synthesizer
            .synthesize(&self.prompts.fallback.text, 0)
            .await
        {
            Ok(audio) => {
                if let Some(segment) = reply.iter_mut().next() {
                    segment.audio = Some(audio);
                }
                Ok(reply)
            }
            Err(synthesis_error) => {
                tracing::error!(error = %synthesis_error, "fallback synthesis failed");
                Err(PipelineFailure { error, reply })
            }
        }
    }
}
