//! Prompt templates configuration
//!
//! The fixed system instruction plus the canned replies served without
//! touching any remote capability.

use serde::{Deserialize, Serialize};

use avatar_agent_core::{Animation, Expression, ReplySegment, ReplySet, MAX_REPLY_SEGMENTS};

/// Prompt templates configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptLibrary {
    /// System instruction sent with every generation request
    #[serde(default)]
    pub system: SystemInstruction,

    /// Served when the caller sends no utterance
    #[serde(default = "CannedReply::greeting")]
    pub greeting: CannedReply,

    /// Served when vendor credentials are missing
    #[serde(default = "CannedReply::missing_keys")]
    pub missing_keys: CannedReply,

    /// Served when the main response path fails
    #[serde(default = "CannedReply::fallback")]
    pub fallback: CannedReply,

    /// Used by the audio smoke-test endpoint
    #[serde(default = "CannedReply::audio_check")]
    pub audio_check: CannedReply,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self {
            system: SystemInstruction::default(),
            greeting: CannedReply::greeting(),
            missing_keys: CannedReply::missing_keys(),
            fallback: CannedReply::fallback(),
            audio_check: CannedReply::audio_check(),
        }
    }
}

/// System instruction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInstruction {
    /// Persona line
    pub persona: String,
    /// Output format rules
    pub format_rules: Vec<String>,
}

impl Default for SystemInstruction {
    fn default() -> Self {
        Self {
            persona: "You are a friendly virtual companion speaking through an animated avatar."
                .to_string(),
            format_rules: vec![
                format!(
                    "Always reply with a valid JSON array of at most {} message objects.",
                    MAX_REPLY_SEGMENTS
                ),
                "Each object must have \"text\", \"facialExpression\" and \"animation\" \
                 properties."
                    .to_string(),
                "facialExpression is one of: default, smile, sad, angry, surprised, funnyFace, \
                 crazy."
                    .to_string(),
                "animation is one of: Idle, Talking_0, Talking_1, Talking_2, Crying, Laughing, \
                 Rumba, Terrified, Angry."
                    .to_string(),
                "Keep each message short and conversational.".to_string(),
            ],
        }
    }
}

impl SystemInstruction {
    /// Build the full instruction text
    pub fn build(&self) -> String {
        let mut prompt = format!("{}\n\n## Reply format\n", self.persona);
        for rule in &self.format_rules {
            prompt.push_str(&format!("- {}\n", rule));
        }
        prompt
    }
}

/// A fixed single-segment reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedReply {
    pub text: String,
    pub expression: Expression,
    pub animation: Animation,
}

impl CannedReply {
    pub fn greeting() -> Self {
        Self {
            text: "Hello there! How can I help you today?".to_string(),
            expression: Expression::Smile,
            animation: Animation::Talking1,
        }
    }

    pub fn missing_keys() -> Self {
        Self {
            text: "Please add your Gemini and ElevenLabs API keys!".to_string(),
            expression: Expression::Angry,
            animation: Animation::Angry,
        }
    }

    pub fn fallback() -> Self {
        Self {
            text: "I'm having technical difficulties. Please try again later... bye bye"
                .to_string(),
            expression: Expression::Sad,
            animation: Animation::Crying,
        }
    }

    pub fn audio_check() -> Self {
        Self {
            text: "Hello! This is a test of the audio system working perfectly!".to_string(),
            expression: Expression::Smile,
            animation: Animation::Talking1,
        }
    }

    pub fn to_segment(&self) -> ReplySegment {
        ReplySegment::new(self.text.clone(), self.expression, self.animation)
    }

    pub fn to_reply_set(&self) -> ReplySet {
        ReplySet::single(self.to_segment())
    }
}
