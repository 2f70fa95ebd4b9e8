//! Kotoha Engine — vision-language chat backend for virtual character
//! interaction.
//!
//! The core is a request-response orchestrator: a user turn (text +
//! optional image) plus rolling history goes in, a cleaned reply with an
//! optional emotion tag comes out. Everything flows forward through
//! `roles` → `vision` → `chat::context` → `model::renderer` →
//! `model::invoker` → `chat::postprocess`; the warp routes in `server`
//! are thin plumbing on top.

pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod roles;
pub mod server;
pub mod vision;
