//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cocina_commerce::{StoreConfig, UiConfig};
use serde::{Deserialize, Serialize};

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["cocina.toml", ".cocina.toml", "cocina.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Drawer and badge settings.
    #[serde(default)]
    pub ui: UiConfig,

    /// Where carts and sessions are kept.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per stored key.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Pinned session id. When unset the current session from storage is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".cocina").join("store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            session: None,
        }
    }
}

/// Generate a default cocina.toml config file.
pub fn generate_default_config() -> String {
    r#"# Cocina storefront configuration

[store]
currency = "EUR"
namespace = "cart"
max_quantity_per_item = 9999

[ui]
show_cart = true
open_on_add = true
badge_cap = 99

[storage]
dir = ".cocina/store"
# session = "sess_local"
"#
    .to_string()
}
