//! Reply parser
//!
//! Decodes the model's raw completion into a bounded [`ReplySet`]. Strict on
//! the array shape and on text presence, lenient on the cosmetic tags.

use serde::Deserialize;

use avatar_agent_core::{
    Animation, Expression, ParseError, ReplySegment, ReplySet, MAX_REPLY_SEGMENTS,
};

/// Parser for the model's structured reply
#[derive(Debug, Clone)]
pub struct ReplyParser {
    max_segments: usize,
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self {
            max_segments: MAX_REPLY_SEGMENTS,
        }
    }
}

impl ReplyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode raw model text into an ordered reply set.
    ///
    /// The document must be a JSON array; each element needs a non-empty
    /// `text`. Extra elements beyond the segment cap are dropped rather than
    /// failing, which keeps downstream synthesis cost bounded when the model
    /// ignores its instructions.
    pub fn parse(&self, raw: &str) -> Result<ReplySet, ParseError> {
        let document: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ParseError::MalformedJson(e.to_string()))?;

        let items = document.as_array().ok_or(ParseError::NotAnArray)?;

        if items.len() > self.max_segments {
            tracing::warn!(
                returned = items.len(),
                kept = self.max_segments,
                "model exceeded segment cap, truncating"
            );
        }

        let mut segments = Vec::with_capacity(items.len().min(self.max_segments));
        for (index, item) in items.iter().take(self.max_segments).enumerate() {
            let raw: RawSegment = serde_json::from_value(item.clone())
                .map_err(|e| ParseError::MalformedJson(format!("segment {}: {}", index, e)))?;

            if raw.text.trim().is_empty() {
                return Err(ParseError::EmptyText(index));
            }

            segments.push(ReplySegment::new(
                raw.text,
                raw.facial_expression
                    .as_deref()
                    .map_or_else(Expression::default, Expression::from_tag),
                raw.animation
                    .as_deref()
                    .map_or_else(Animation::default, Animation::from_tag),
            ));
        }

        Ok(ReplySet::from_segments(segments))
    }
}

/// Wire shape of one model-emitted segment
#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "facialExpression")]
    facial_expression: Option<String>,
    #[serde(default)]
    animation: Option<String>,
}
