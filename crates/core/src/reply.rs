//! Avatar reply types
//!
//! A reply is an ordered set of at most [`MAX_REPLY_SEGMENTS`] segments. Each
//! segment carries the spoken text, a facial expression tag, an animation tag,
//! and, once synthesis has run, the rendered audio bytes. Segment order is
//! playback order and is preserved end-to-end.

use serde::{Deserialize, Serialize};

/// Upper bound on segments in a single reply.
///
/// The system instruction asks the model to stay within this bound; the
/// parser additionally enforces it by truncation so synthesis cost stays
/// bounded even when the model ignores the instruction.
pub const MAX_REPLY_SEGMENTS: usize = 3;

/// Facial expression tag understood by the avatar frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    #[default]
    Default,
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    Crazy,
}

impl Expression {
    /// Decode a wire tag, falling back to `Default` for anything the
    /// frontend does not know. Cosmetic fields are lenient.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "smile" => Expression::Smile,
            "sad" => Expression::Sad,
            "angry" => Expression::Angry,
            "surprised" => Expression::Surprised,
            "funnyFace" => Expression::FunnyFace,
            "crazy" => Expression::Crazy,
            _ => Expression::Default,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Expression::Default => "default",
            Expression::Smile => "smile",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Surprised => "surprised",
            Expression::FunnyFace => "funnyFace",
            Expression::Crazy => "crazy",
        }
    }
}

/// Animation clip tag understood by the avatar frontend.
///
/// Tags match the clip names in the avatar's GLTF model, hence the
/// non-idiomatic casing on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Animation {
    #[default]
    #[serde(rename = "Idle")]
    Idle,
    #[serde(rename = "Talking_0")]
    Talking0,
    #[serde(rename = "Talking_1")]
    Talking1,
    #[serde(rename = "Talking_2")]
    Talking2,
    #[serde(rename = "Crying")]
    Crying,
    #[serde(rename = "Laughing")]
    Laughing,
    #[serde(rename = "Rumba")]
    Rumba,
    #[serde(rename = "Terrified")]
    Terrified,
    #[serde(rename = "Angry")]
    Angry,
}

impl Animation {
    /// Decode a wire tag, falling back to `Idle` for unknown clips.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Talking_0" => Animation::Talking0,
            "Talking_1" => Animation::Talking1,
            "Talking_2" => Animation::Talking2,
            "Crying" => Animation::Crying,
            "Laughing" => Animation::Laughing,
            "Rumba" => Animation::Rumba,
            "Terrified" => Animation::Terrified,
            "Angry" => Animation::Angry,
            _ => Animation::Idle,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Animation::Idle => "Idle",
            Animation::Talking0 => "Talking_0",
            Animation::Talking1 => "Talking_1",
            Animation::Talking2 => "Talking_2",
            Animation::Crying => "Crying",
            Animation::Laughing => "Laughing",
            Animation::Rumba => "Rumba",
            Animation::Terrified => "Terrified",
            Animation::Angry => "Angry",
        }
    }
}

/// One unit of the avatar's reply.
///
/// Produced by the parser without audio; the synthesis stage attaches the
/// audio bytes in place. Owned exclusively by the in-flight request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplySegment {
    /// Spoken text, non-empty.
    pub text: String,
    /// Facial expression the avatar holds while speaking.
    pub expression: Expression,
    /// Animation clip played alongside.
    pub animation: Animation,
    /// Synthesized audio, absent until the synthesis stage has run.
    pub audio: Option<Vec<u8>>,
}

impl ReplySegment {
    pub fn new(text: impl Into<String>, expression: Expression, animation: Animation) -> Self {
        Self {
            text: text.into(),
            expression,
            animation,
            audio: None,
        }
    }

    /// Whether non-empty audio is attached.
    pub fn has_audio(&self) -> bool {
        self.audio.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Ordered sequence of reply segments, bounded to [`MAX_REPLY_SEGMENTS`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplySet {
    segments: Vec<ReplySegment>,
}

impl ReplySet {
    /// Build a reply set, truncating to the segment cap.
    pub fn from_segments(mut segments: Vec<ReplySegment>) -> Self {
        segments.truncate(MAX_REPLY_SEGMENTS);
        Self { segments }
    }

    /// Single-segment reply (canned greetings, fallback).
    pub fn single(segment: ReplySegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[ReplySegment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReplySegment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ReplySegment> {
        self.segments.iter_mut()
    }

    pub fn into_segments(self) -> Vec<ReplySegment> {
        self.segments
    }

    /// Whether every segment carries non-empty audio.
    pub fn fully_voiced(&self) -> bool {
        self.segments.iter().all(ReplySegment::has_audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_tags_round_trip() {
        for expr in [
            Expression::Default,
            Expression::Smile,
            Expression::Sad,
            Expression::Angry,
            Expression::Surprised,
            Expression::FunnyFace,
            Expression::Crazy,
        ] {
            assert_eq!(Expression::from_tag(expr.as_tag()), expr);
        }
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        assert_eq!(Expression::from_tag("wink"), Expression::Default);
        assert_eq!(Animation::from_tag("Backflip"), Animation::Idle);
    }

    #[test]
    fn test_serde_tags_match_frontend() {
        let json = serde_json::to_string(&Expression::FunnyFace).unwrap();
        assert_eq!(json, "\"funnyFace\"");
        let json = serde_json::to_string(&Animation::Talking1).unwrap();
        assert_eq!(json, "\"Talking_1\"");

        let anim: Animation = serde_json::from_str("\"Crying\"").unwrap();
        assert_eq!(anim, Animation::Crying);
    }

    #[test]
    fn test_reply_set_truncates_to_cap() {
        let segments = (0..5)
            .map(|i| ReplySegment::new(format!("part {}", i), Expression::Smile, Animation::Talking0))
            .collect();
        let set = ReplySet::from_segments(segments);
        assert_eq!(set.len(), MAX_REPLY_SEGMENTS);
        assert_eq!(set.segments()[0].text, "part 0");
        assert_eq!(set.segments()[2].text, "part 2");
    }

    #[test]
    fn test_fully_voiced() {
        let mut set = ReplySet::single(ReplySegment::new(
            "hello",
            Expression::Smile,
            Animation::Talking1,
        ));
        assert!(!set.fully_voiced());

        set.iter_mut().next().unwrap().audio = Some(vec![1, 2, 3]);
        assert!(set.fully_voiced());
    }
}
