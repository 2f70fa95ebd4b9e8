//! App configuration — one JSON file, serde defaults for every field.

use crate::model::backend::GenerationParams;
use crate::vision::ImageLimits;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "kotoha_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub roles_dir: PathBuf,
    pub image: ImageLimits,
    pub chat: ChatConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Trailing history turns kept per request. Small on purpose — long
    /// windows blow up accelerator memory on vision models.
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { history_window: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// "mock", or "disabled" to serve without a model.
    pub backend: String,
    pub model_id: String,
    pub model_name: String,
    pub generation: GenerationParams,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: "disabled".to_string(),
            model_id: "Qwen/Qwen2-VL-2B-Instruct".to_string(),
            model_name: "Qwen2-VL 2B".to_string(),
            generation: GenerationParams::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            roles_dir: PathBuf::from("roles"),
            image: ImageLimits::default(),
            chat: ChatConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                info!(path = %path.display(), "[{}] loaded config", label);
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "[{}] config unparsable, using defaults", label);
                T::default()
            }
        },
        Err(_) => {
            info!(path = %path.display(), "[{}] no config file, using defaults", label);
            T::default()
        }
    }
}
