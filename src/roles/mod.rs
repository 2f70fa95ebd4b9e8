//! Role definitions and the startup-loaded role registry.

mod registry;
mod role;

pub use registry::RoleRegistry;
pub use role::{Live2dConfig, Role, RoleSummary};
