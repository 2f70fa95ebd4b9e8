//! `VlmBackend` — common interface for vision-language generation backends.

use crate::chat::ChatMessage;
use crate::vision::NormalizedImage;
use serde::{Deserialize, Serialize};

/// Fixed sampling configuration for one generation call (sampling enabled,
/// not greedy).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.1,
        }
    }
}

/// Generation-ready inputs produced by `VlmBackend::encode`. `input_ids`
/// length is the prompt-echo offset the invoker trims from the output.
#[derive(Debug, Clone)]
pub struct EncodedPrompt {
    pub input_ids: Vec<u32>,
    pub has_image: bool,
}

/// Common interface for vision-language model providers.
///
/// Methods are synchronous: a backend call is local accelerator-bound
/// compute, and the pipeline runs it under `spawn_blocking`. Template
/// application must surface failures as errors, never panic — the caller
/// has a degraded fallback path for them.
pub trait VlmBackend: Send + Sync {
    /// Render a structured message sequence into the model's prompt format.
    fn apply_chat_template(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;

    /// Encode a rendered prompt (+ optional image) into generation inputs.
    fn encode(&self, prompt: &str, image: Option<&NormalizedImage>)
        -> anyhow::Result<EncodedPrompt>;

    /// Run one generation call. Returns the full output token sequence,
    /// prompt echo included.
    fn generate(&self, input: &EncodedPrompt, params: &GenerationParams)
        -> anyhow::Result<Vec<u32>>;

    /// Decode token ids to text, skipping special tokens.
    fn decode(&self, token_ids: &[u32]) -> anyhow::Result<String>;

    /// Backend identifier (e.g. "mock").
    fn id(&self) -> &str;

    /// Upstream model identifier, for health reporting.
    fn model_id(&self) -> &str;

    /// Human-readable model name, for health reporting.
    fn model_name(&self) -> &str;

    /// Device the model runs on ("cpu", "cuda", ...).
    fn device(&self) -> &str;
}
