//! Language model trait

use async_trait::async_trait;

use crate::error::ModelError;
use crate::prompt::PromptContext;

/// Language model interface
///
/// Implementations:
/// - `GeminiBackend` - Google Gemini generateContent API
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(GeminiBackend::new(config)?);
/// let ctx = PromptContext::new(system_instruction, "tell me a story");
/// let raw = llm.generate(&ctx).await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate one completion for the given prompt context.
    ///
    /// Implementations retry transient overload internally under their own
    /// backoff policy; any error returned here is terminal for the request.
    async fn generate(&self, context: &PromptContext) -> Result<String, ModelError>;

    /// Check whether the backend is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Model name for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLlm;

    #[async_trait]
    impl LanguageModel for MockLlm {
        async fn generate(&self, context: &PromptContext) -> Result<String, ModelError> {
            Ok(format!("echo: {}", context.user_utterance))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock-llm"
        }
    }

    #[tokio::test]
    async fn test_mock_llm() {
        let llm = MockLlm;
        assert!(llm.is_available().await);
        assert_eq!(llm.model_name(), "mock-llm");

        let ctx = PromptContext::new("be terse", "hello");
        let raw = llm.generate(&ctx).await.unwrap();
        assert_eq!(raw, "echo: hello");
    }
}
