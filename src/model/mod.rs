//! Generation backend boundary: the `VlmBackend` trait, prompt rendering,
//! generation invocation, and the managed `ModelService`.

pub mod backend;
pub mod invoker;
pub mod mock;
pub mod renderer;
pub mod service;

pub use backend::{EncodedPrompt, GenerationParams, VlmBackend};
pub use mock::MockVlm;
pub use renderer::{RenderFailure, RenderedPrompt};
pub use service::ModelService;
