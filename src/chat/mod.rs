//! Conversation-context construction, response post-processing, and the
//! per-request chat pipeline.

pub mod context;
pub mod postprocess;
pub mod prompts;
pub mod service;

#[cfg(test)]
mod tests;

pub use context::{build_context, ChatMessage, ContentPart, ConversationContext, MessageContent, Turn};
pub use postprocess::{postprocess, ChatReply};
pub use service::{ChatRequest, ChatService};
