//! Capability traits fulfilled by vendor-specific adapters

pub mod llm;
pub mod speech;

pub use llm::LanguageModel;
pub use speech::{SpeechSynthesizer, VoiceInfo};
