//! Core traits and types for the avatar agent
//!
//! This crate provides foundational types used across all other crates:
//! - Capability traits for pluggable backends (language model, speech synthesis)
//! - Reply types (segments, expression/animation tags)
//! - Prompt context
//! - Error taxonomy

pub mod error;
pub mod prompt;
pub mod reply;
pub mod traits;

pub use error::{ModelError, ParseError, PipelineError, SynthesisError};
pub use prompt::PromptContext;
pub use reply::{Animation, Expression, ReplySegment, ReplySet, MAX_REPLY_SEGMENTS};
pub use traits::{LanguageModel, SpeechSynthesizer, VoiceInfo};
