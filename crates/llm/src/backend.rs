//! Gemini backend
//!
//! Sends the prompt context to the Gemini generateContent API, requesting a
//! single JSON candidate with deterministic-leaning sampling. Transient
//! overload (5xx, 429, transport failures) is retried with linear backoff;
//! everything else fails the call immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use avatar_agent_core::{LanguageModel, ModelError, PromptContext};

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model name
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Temperature
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum attempts for one generate call
    pub max_retries: u32,
    /// Backoff base; the wait before attempt n+1 is n * base
    pub backoff_base: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            temperature: 0.6,
            top_p: 0.95,
            top_k: 40,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl GeminiConfig {
    /// Backoff after the n-th failed attempt (1-based). Linear, so
    /// consecutive waits strictly increase.
    fn backoff_for(&self, failed_attempts: u32) -> Duration {
        self.backoff_base * failed_attempts
    }
}

/// Gemini generateContent backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    ///
    /// An absent API key is not a construction error: the orchestrator's
    /// precondition check keeps such a backend from ever being called, and
    /// `is_available` reports it as down.
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ModelError::NonRetryable(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        )
    }

    /// Execute a single request (used by the retry loop)
    async fn execute_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, ModelError> {
        let response = self
            .client
            .post(self.api_url())
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = decode_error_message(&body).unwrap_or(body);
            // Overload signals are retryable, everything else is not
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ModelError::Transient(format!("{}: {}", status, message)));
            }
            return Err(ModelError::NonRetryable(format!("{}: {}", status, message)));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::NonRetryable(format!("undecodable response: {}", e)))?;

        response
            .first_text()
            .ok_or_else(|| ModelError::NonRetryable("empty completion".to_string()))
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    async fn generate(&self, context: &PromptContext) -> Result<String, ModelError> {
        let request = GenerateContentRequest::from_context(context, &self.config);

        let mut last = String::new();
        for attempt in 1..=self.config.max_retries {
            if attempt > 1 {
                let backoff = self.config.backoff_for(attempt - 1);
                tracing::warn!(
                    attempt,
                    max_attempts = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "model overloaded, backing off before retry"
                );
                tokio::time::sleep(backoff).await;
            }

            match self.execute_request(&request).await {
                Ok(text) => return Ok(text),
                Err(ModelError::Transient(msg)) => last = msg,
                Err(e) => return Err(e),
            }
        }

        Err(ModelError::RetriesExhausted {
            attempts: self.config.max_retries,
            last,
        })
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_context(context: &PromptContext, config: &GeminiConfig) -> Self {
        Self {
            contents: vec![Content::user(&context.user_utterance)],
            system_instruction: Content::system(&context.system_instruction),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                candidate_count: 1,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: "system".to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    candidate_count: u32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn decode_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const OVERLOADED_BODY: &str = r#"{"error":{"code":503,"message":"The model is overloaded."}}"#;
    const COMPLETION_BODY: &str =
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[]"}]}}]}"#;

    /// Vendor stub that fails `failures` times with the given status, then
    /// serves a valid completion. Returns the endpoint and a call counter.
    async fn spawn_vendor(status: StatusCode, failures: usize) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let app = axum::Router::new().fallback(move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    (status, OVERLOADED_BODY.to_string())
                } else {
                    (StatusCode::OK, COMPLETION_BODY.to_string())
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), calls)
    }

    fn test_config(endpoint: String) -> GeminiConfig {
        GeminiConfig {
            endpoint,
            api_key: "test-key".to_string(),
            backoff_base: Duration::from_millis(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_backoff_strictly_increases() {
        let config = GeminiConfig::default();
        assert!(config.backoff_for(1) < config.backoff_for(2));
        assert!(config.backoff_for(2) < config.backoff_for(3));
        assert_eq!(config.backoff_for(2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_availability_requires_api_key() {
        let backend = GeminiBackend::new(GeminiConfig::default()).unwrap();
        assert!(!backend.is_available().await);

        let backend = GeminiBackend::new(test_config("http://localhost".to_string())).unwrap();
        assert!(backend.is_available().await);
    }

    #[test]
    fn test_request_serialization() {
        let ctx = PromptContext::new("be terse", "hello");
        let request = GenerateContentRequest::from_context(&ctx, &GeminiConfig::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["candidateCount"], 1);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_response_parsing() {
        let response: GenerateContentResponse = serde_json::from_str(COMPLETION_BODY).unwrap();
        assert_eq!(response.first_text().unwrap(), "[]");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.first_text().is_none());
    }

    #[test]
    fn test_error_body_decoding() {
        assert_eq!(
            decode_error_message(OVERLOADED_BODY).unwrap(),
            "The model is overloaded."
        );
        assert!(decode_error_message("not json").is_none());
    }

    #[tokio::test]
    async fn test_recovers_after_transient_overload() {
        let (endpoint, calls) = spawn_vendor(StatusCode::SERVICE_UNAVAILABLE, 2).await;
        let backend = GeminiBackend::new(test_config(endpoint)).unwrap();

        let ctx = PromptContext::new("sys", "hi");
        let text = backend.generate(&ctx).await.unwrap();

        assert_eq!(text, "[]");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_retries_on_persistent_overload() {
        let (endpoint, calls) = spawn_vendor(StatusCode::SERVICE_UNAVAILABLE, usize::MAX).await;
        let backend = GeminiBackend::new(test_config(endpoint)).unwrap();

        let ctx = PromptContext::new("sys", "hi");
        let err = backend.generate(&ctx).await.unwrap_err();

        assert!(matches!(
            err,
            ModelError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_fails_without_retry() {
        let (endpoint, calls) = spawn_vendor(StatusCode::FORBIDDEN, usize::MAX).await;
        let backend = GeminiBackend::new(test_config(endpoint)).unwrap();

        let ctx = PromptContext::new("sys", "hi");
        let err = backend.generate(&ctx).await.unwrap_err();

        assert!(matches!(err, ModelError::NonRetryable(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
