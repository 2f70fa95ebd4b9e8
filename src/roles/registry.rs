//! Role registry — scans the roles directory once at startup, read-only after.

use crate::error::ChatError;
use crate::roles::role::{Role, RoleSummary};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

const ROLE_FILE: &str = "config.json";

/// Immutable mapping of role id (subdirectory name) → parsed Role.
/// Built once in `main`, shared behind an `Arc` across requests.
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
}

impl RoleRegistry {
    /// Scan `dir` for subdirectories containing a `config.json` role file.
    /// A missing directory yields an empty registry; a malformed role file
    /// is logged and skipped, never fatal.
    pub fn load(dir: &Path) -> Self {
        let mut roles = HashMap::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "roles directory unavailable, starting with empty registry");
                return Self { roles };
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();
            let role_file = path.join(ROLE_FILE);
            if !role_file.exists() {
                debug!(role_id = %id, "no {} in role directory, skipping", ROLE_FILE);
                continue;
            }
            match load_role(&id, &role_file) {
                Ok(role) => {
                    info!(role_id = %id, name = %role.name, "loaded role");
                    roles.insert(id, role);
                }
                Err(err) => warn!(error = %err, "skipping role"),
            }
        }

        info!(count = roles.len(), "role registry loaded");
        Self { roles }
    }

    pub fn lookup(&self, role_id: &str) -> Option<&Role> {
        self.roles.get(role_id)
    }

    /// System prompt for a role; empty string if the role is absent or has
    /// none configured.
    pub fn system_prompt(&self, role_id: &str) -> String {
        self.roles
            .get(role_id)
            .map(|r| r.system_prompt.clone())
            .unwrap_or_default()
    }

    /// Default emotion for a role. Only present when the role exists and its
    /// Live2D config is enabled.
    pub fn default_emotion(&self, role_id: &str) -> Option<String> {
        let role = self.roles.get(role_id)?;
        if !role.live2d.enabled {
            return None;
        }
        role.live2d.default_emotion.clone()
    }

    /// Public fields of every role (system prompts excluded), sorted by id
    /// for stable listing output.
    pub fn summaries(&self) -> Vec<RoleSummary> {
        let mut out: Vec<RoleSummary> = self
            .roles
            .iter()
            .map(|(id, role)| RoleSummary::from_role(id, role))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Build a registry directly from in-memory roles. Test fixtures only.
    #[cfg(test)]
    pub(crate) fn with_roles(roles: Vec<(&str, Role)>) -> Self {
        Self {
            roles: roles
                .into_iter()
                .map(|(id, role)| (id.to_string(), role))
                .collect(),
        }
    }
}

fn load_role(id: &str, file: &Path) -> Result<Role, ChatError> {
    let content = std::fs::read_to_string(file).map_err(|e| ChatError::RoleLoad {
        id: id.to_string(),
        source: e.into(),
    })?;
    serde_json::from_str(&content).map_err(|e| ChatError::RoleLoad {
        id: id.to_string(),
        source: e.into(),
    })
}
