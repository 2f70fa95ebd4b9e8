//! Prompt rendering: primary chat-template path plus the minimal fallback
//! used when templating fails.
//!
//! The two stages are explicit: `render` reports a `RenderFailure` and the
//! caller decides to invoke `render_fallback`, which discards system prompt
//! and history and keeps only the current user message. That loss of
//! fidelity is the accepted degradation, and callers log it distinctly.

use crate::chat::ConversationContext;
use crate::error::ChatError;
use crate::model::backend::{EncodedPrompt, VlmBackend};
use crate::vision::NormalizedImage;
use thiserror::Error;

/// The primary path failed; the caller may retry with `render_fallback`.
#[derive(Debug, Error)]
#[error("chat template application failed: {0}")]
pub struct RenderFailure(#[from] anyhow::Error);

/// A generation-ready prompt. `fallback` records which path produced it.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub encoded: EncodedPrompt,
    pub fallback: bool,
}

/// Primary path: full context through the backend's chat template, then
/// encoded with the optional image.
pub fn render(
    backend: &dyn VlmBackend,
    context: &ConversationContext,
    image: Option<&NormalizedImage>,
) -> Result<RenderedPrompt, RenderFailure> {
    let prompt = backend.apply_chat_template(&context.messages)?;
    let encoded = backend.encode(&prompt, image)?;
    Ok(RenderedPrompt {
        encoded,
        fallback: false,
    })
}

/// Fallback path: a fixed-format prompt carrying only the current message.
/// If even this fails the request is dead — `PromptRender` is fatal.
pub fn render_fallback(
    backend: &dyn VlmBackend,
    message: &str,
    image: Option<&NormalizedImage>,
) -> Result<RenderedPrompt, ChatError> {
    let prompt = fallback_prompt(message);
    let encoded = backend
        .encode(&prompt, image)
        .map_err(ChatError::PromptRender)?;
    Ok(RenderedPrompt {
        encoded,
        fallback: true,
    })
}

pub(crate) fn fallback_prompt(message: &str) -> String {
    format!("<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n", message)
}
