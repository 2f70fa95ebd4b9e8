//! Builds the ordered message sequence fed to prompt templating:
//! one system message, a trailing window of history, the current turn.

use crate::chat::prompts::{GENERIC_SYSTEM_PROMPT, HISTORY_INSTRUCTION};
use crate::error::ChatError;
use crate::roles::RoleRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One history entry as supplied by the caller. The role is kept as a raw
/// string at this boundary; anything other than "user"/"assistant" is
/// skipped during context construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content (serializes as a JSON string)
    Text(String),
    /// Array of content parts for multimodal messages (image + text)
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// Placeholder for the request's image; the pixel data itself travels
    /// separately to the backend's encode step.
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "text")]
    Text { text: String },
}

impl MessageContent {
    /// Extract the text content, ignoring any image parts.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn text(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: MessageContent::Text(content),
        }
    }
}

/// The per-request message sequence. Immutable once built.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub messages: Vec<ChatMessage>,
}

/// Assemble the conversation context for one request.
///
/// The system prompt comes from the role when it has one (augmented with the
/// history instruction), otherwise the generic assistant prompt. History is
/// windowed to the most recent `history_window` turns before role filtering,
/// matching the original `history[-N:]` behavior.
pub fn build_context(
    message: &str,
    has_image: bool,
    history: &[Turn],
    role_id: Option<&str>,
    registry: &RoleRegistry,
    history_window: usize,
) -> Result<ConversationContext, ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let mut messages = Vec::with_capacity(history.len().min(history_window) + 2);

    let system = match role_id.map(|id| registry.system_prompt(id)) {
        Some(prompt) if !prompt.is_empty() => {
            format!("{}\n\n{}", prompt, HISTORY_INSTRUCTION)
        }
        _ => GENERIC_SYSTEM_PROMPT.to_string(),
    };
    messages.push(ChatMessage::text("system", system));

    let start = history.len().saturating_sub(history_window);
    for turn in &history[start..] {
        match turn.role.as_str() {
            "user" | "assistant" => {
                messages.push(ChatMessage::text(&turn.role, turn.content.clone()));
            }
            other => {
                debug!(role = other, "skipping history turn with unrecognized role");
            }
        }
    }

    let content = if has_image {
        MessageContent::Parts(vec![
            ContentPart::Image,
            ContentPart::Text {
                text: message.to_string(),
            },
        ])
    } else {
        MessageContent::Text(message.to_string())
    };
    messages.push(ChatMessage {
        role: "user".to_string(),
        content,
    });

    Ok(ConversationContext { messages })
}
