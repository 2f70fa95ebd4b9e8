//! The per-request chat pipeline: normalize image → build context →
//! render (with fallback) → generate → post-process.

use crate::chat::context::{build_context, Turn};
use crate::chat::postprocess::{postprocess, ChatReply};
use crate::error::ChatError;
use crate::model::{invoker, renderer, ModelService};
use crate::roles::RoleRegistry;
use crate::vision::{self, ImageLimits};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One chat request as handed over by the HTTP layer. `image` carries raw
/// encoded bytes, base64 already stripped.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub image: Option<Vec<u8>>,
    pub history: Vec<Turn>,
    pub role_id: Option<String>,
}

/// Request-scoped orchestrator over the shared registry and model handle.
/// Cheap to clone; all shared state is immutable after startup.
#[derive(Clone)]
pub struct ChatService {
    roles: Arc<RoleRegistry>,
    model: ModelService,
    limits: ImageLimits,
    history_window: usize,
}

impl ChatService {
    pub fn new(
        roles: Arc<RoleRegistry>,
        model: ModelService,
        limits: ImageLimits,
        history_window: usize,
    ) -> Self {
        Self {
            roles,
            model,
            limits,
            history_window,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Validation order matches the contract: empty message first (no model
    /// invocation attempted), then the model check, then the degradable
    /// image and template steps. The blocking render/generate work runs on
    /// a `spawn_blocking` worker so a long accelerator call does not stall
    /// the async runtime.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let backend = self.model.backend()?;

        let image = match &request.image {
            Some(bytes) => match vision::normalize(bytes, &self.limits) {
                Ok(img) => {
                    debug!(width = img.width(), height = img.height(), "image normalized");
                    Some(img)
                }
                Err(err) => {
                    warn!(error = %err, "continuing without image");
                    None
                }
            },
            None => None,
        };

        let context = build_context(
            &request.message,
            image.is_some(),
            &request.history,
            request.role_id.as_deref(),
            &self.roles,
            self.history_window,
        )?;

        let params = self.model.params().clone();
        let message = request.message.clone();
        let raw = tokio::task::spawn_blocking(move || {
            let rendered = match renderer::render(backend.as_ref(), &context, image.as_ref()) {
                Ok(rendered) => rendered,
                Err(failure) => {
                    warn!(error = %failure, "chat template failed, using minimal fallback prompt");
                    renderer::render_fallback(backend.as_ref(), &message, image.as_ref())?
                }
            };
            invoker::invoke(backend.as_ref(), &rendered, &params)
        })
        .await
        .map_err(|e| ChatError::Generation(anyhow::anyhow!("generation task panicked: {}", e)))??;

        info!(chars = raw.chars().count(), "generation complete");
        Ok(postprocess(&raw, request.role_id.as_deref(), &self.roles))
    }
}
