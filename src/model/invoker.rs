//! One generation call per request: generate, trim the prompt echo, decode.

use crate::error::ChatError;
use crate::model::backend::{GenerationParams, VlmBackend};
use crate::model::renderer::RenderedPrompt;

/// Invoke the backend once and decode only the newly generated tokens.
///
/// The output sequence includes the prompt echo; the prefix of length
/// `input_ids.len()` is dropped before decoding (batch size 1, so a single
/// per-sequence offset). Failures are fatal to the request and never
/// retried — a second attempt would most likely hit the same wall.
pub fn invoke(
    backend: &dyn VlmBackend,
    rendered: &RenderedPrompt,
    params: &GenerationParams,
) -> Result<String, ChatError> {
    let output = backend
        .generate(&rendered.encoded, params)
        .map_err(ChatError::Generation)?;

    let prompt_len = rendered.encoded.input_ids.len().min(output.len());
    let new_tokens = &output[prompt_len..];

    backend.decode(new_tokens).map_err(ChatError::Generation)
}
