//! Speech synthesis trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// Vendor voice metadata, exposed upward for caller introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Speech synthesis interface
///
/// Implementations:
/// - `ElevenLabsSynthesizer` - ElevenLabs text-to-speech API
///
/// The voice identity is fixed configuration, not negotiated per request.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize one reply segment into raw audio bytes.
    ///
    /// `segment_index` is the segment's position in its reply set and keys
    /// the on-disk artifact name.
    async fn synthesize(&self, text: &str, segment_index: usize)
        -> Result<Vec<u8>, SynthesisError>;

    /// List voices available from the vendor.
    ///
    /// Introspection for the caller only; the pipeline never calls this.
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError>;

    /// The configured voice identity.
    fn voice_id(&self) -> &str;
}
