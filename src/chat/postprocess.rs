//! Cleans decoded generation text: strips leaked control markers, extracts
//! the leading emotion tag, falls back to the role's default emotion.
//!
//! Pure text transformation — deterministic, no model calls.

use crate::roles::RoleRegistry;
use serde::Serialize;

/// Control markers and role-label echoes the model sometimes leaks into its
/// output. Removed by literal match, in this order.
const CONTROL_MARKERS: [&str; 4] = ["<|im_end|>", "<|im_start|>", "assistant", "Assistant:"];

/// The terminal artifact returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub emotion: Option<String>,
    pub role_id: Option<String>,
}

/// Full post-processing: marker strip, emotion-tag extraction, default
/// emotion fallback for Live2D-enabled roles.
pub fn postprocess(raw: &str, role_id: Option<&str>, registry: &RoleRegistry) -> ChatReply {
    let cleaned = strip_markers(raw);

    let (text, emotion) = match extract_emotion(&cleaned) {
        Some((emotion, remainder)) => (remainder, Some(emotion)),
        None => {
            let fallback = role_id.and_then(|id| registry.default_emotion(id));
            (cleaned, fallback)
        }
    };

    ChatReply {
        text,
        emotion,
        role_id: role_id.map(String::from),
    }
}

/// Remove leaked control markers and trim surrounding whitespace.
pub fn strip_markers(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    for marker in CONTROL_MARKERS {
        text = text.replace(marker, "");
    }
    text.trim().to_string()
}

/// Parse a leading `[情绪:<value>]` / `[情绪：<value>]` tag.
///
/// The tag grammar is anchored at the very start of the text with an
/// enumerated pair of accepted colons; tags appearing mid-text are left
/// embedded in the visible reply. Returns `(emotion, remaining text)`.
pub fn extract_emotion(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix("[情绪")?;
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix('：'))?;
    let close = rest.find(']')?;
    let emotion = rest[..close].trim();
    if emotion.is_empty() {
        return None;
    }
    let remainder = rest[close + 1..].trim().to_string();
    Some((emotion.to_string(), remainder))
}
