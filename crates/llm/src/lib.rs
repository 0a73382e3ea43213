//! Language model integration
//!
//! Gemini `generateContent` client implementing the [`LanguageModel`]
//! capability with transient-failure retry and linear backoff.
//!
//! [`LanguageModel`]: avatar_agent_core::LanguageModel

pub mod backend;

pub use backend::{GeminiBackend, GeminiConfig};
