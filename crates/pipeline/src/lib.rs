//! Response pipeline for the avatar agent
//!
//! This crate turns one user utterance into a spoken, annotated reply:
//! - `ReplyParser` validates and decodes the model's structured output
//! - `ElevenLabsSynthesizer` renders each segment to audio
//! - `ResponsePipeline` sequences generate → parse → synthesize and owns the
//!   fallback policy

pub mod orchestrator;
pub mod parser;
pub mod tts;

pub use orchestrator::{PipelineConfig, PipelineFailure, ResponsePipeline};
pub use parser::ReplyParser;
pub use tts::{ElevenLabsConfig, ElevenLabsSynthesizer};
