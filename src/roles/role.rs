//! Strongly-typed role records parsed from per-role `config.json` files.

use serde::{Deserialize, Serialize};

/// A configured persona. `name` is the only required field; everything else
/// falls back to an empty/disabled default so sparse role files still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub live2d: Live2dConfig,
}

/// Per-role avatar metadata. `default_emotion` is only consulted when
/// `enabled` is true. Fields the engine does not read (motion groups,
/// hit areas, ...) are preserved in `extra` for the role-detail endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Live2dConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub default_emotion: Option<String>,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Public view of a role for the listing endpoint — everything except the
/// system prompt, which stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub personality: Vec<String>,
    pub live2d: Live2dConfig,
}

impl RoleSummary {
    pub fn from_role(id: &str, role: &Role) -> Self {
        Self {
            id: id.to_string(),
            name: role.name.clone(),
            nickname: role.nickname.clone(),
            description: role.description.clone(),
            personality: role.personality.clone(),
            live2d: role.live2d.clone(),
        }
    }
}
