//! Managed state holding the optional generation backend + sampling params.

use crate::config::ModelConfig;
use crate::error::ChatError;
use crate::model::backend::{GenerationParams, VlmBackend};
use crate::model::mock::MockVlm;
use std::sync::Arc;
use tracing::{info, warn};

/// Process-wide model handle, built once at startup. `backend` is `None`
/// when no model is loaded; the server keeps running and every chat request
/// surfaces `ModelNotLoaded` until a backend is registered.
#[derive(Clone)]
pub struct ModelService {
    backend: Option<Arc<dyn VlmBackend>>,
    params: GenerationParams,
}

impl ModelService {
    /// Factory: build the configured backend. Unknown backend names run
    /// without a model rather than aborting startup.
    pub fn from_config(config: &ModelConfig) -> Self {
        let backend: Option<Arc<dyn VlmBackend>> = match config.backend.as_str() {
            "mock" => {
                info!("initializing mock VLM backend");
                Some(Arc::new(MockVlm::new()))
            }
            "disabled" => {
                warn!("model backend disabled, chat requests will fail until one is registered");
                None
            }
            other => {
                warn!(backend = other, "unknown model backend, running without a model");
                None
            }
        };
        Self {
            backend,
            params: config.generation.clone(),
        }
    }

    /// Register a real backend (e.g. an accelerator-bound engine).
    pub fn with_backend(backend: Arc<dyn VlmBackend>, params: GenerationParams) -> Self {
        Self {
            backend: Some(backend),
            params,
        }
    }

    /// A service with no backend loaded.
    pub fn disabled(params: GenerationParams) -> Self {
        Self {
            backend: None,
            params,
        }
    }

    /// The loaded backend, or `ModelNotLoaded`.
    pub fn backend(&self) -> Result<Arc<dyn VlmBackend>, ChatError> {
        self.backend.clone().ok_or(ChatError::ModelNotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}
