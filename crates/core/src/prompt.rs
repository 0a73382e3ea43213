//! Prompt context assembled per request
//!
//! Deliberately carries no history: every request is a fresh, single-turn
//! exchange.

/// Input handed to the language model for one request.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Fixed instruction constraining persona and output format.
    pub system_instruction: String,
    /// The caller's free-text utterance.
    pub user_utterance: String,
}

impl PromptContext {
    pub fn new(system_instruction: impl Into<String>, user_utterance: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_utterance: user_utterance.into(),
        }
    }
}
