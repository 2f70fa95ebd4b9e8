//! Request-level error taxonomy for the chat pipeline.
//!
//! Only two of these ever abort a request outright: `EmptyMessage` (client
//! input, mapped to 400 by the HTTP layer) and `Generation` / `ModelNotLoaded`
//! (mapped to 500). `ImageDecode` and `PromptRender` mark degrade paths: the
//! pipeline logs them and continues with reduced fidelity.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The client sent an empty or whitespace-only message.
    #[error("消息不能为空")]
    EmptyMessage,

    /// No generation backend is loaded. The server keeps running; every chat
    /// request fails with this until a backend is registered.
    #[error("模型未加载")]
    ModelNotLoaded,

    /// The uploaded image bytes could not be decoded. Absorbed by the
    /// pipeline — the request continues text-only.
    #[error("image decode failed: {0}")]
    ImageDecode(anyhow::Error),

    /// Prompt rendering failed even on the fallback path.
    #[error("prompt rendering failed: {0}")]
    PromptRender(anyhow::Error),

    /// The generation backend failed mid-request. Fatal to this request,
    /// never retried.
    #[error("generation failed: {0}")]
    Generation(anyhow::Error),

    /// A single role definition could not be loaded. Logged and skipped
    /// during the registry scan; never aborts the scan.
    #[error("failed to load role '{id}': {source}")]
    RoleLoad { id: String, source: anyhow::Error },
}
