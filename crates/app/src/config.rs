//! Application settings

use anyhow::Context;
use export::ExportFormat;
use overlay::OverlayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "SNAPREGION_CONFIG";

/// What happens to a captured image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputAction {
    #[default]
    Save,
    Clipboard,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub action: OutputAction,
    /// Format preselected in the save dialog
    pub format: ExportFormat,
    /// Directory the save dialog opens in
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub overlay: OverlayConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        config
            .overlay
            .validate()
            .with_context(|| format!("checking settings {}", path.display()))?;
        Ok(config)
    }
}

/// Settings path from the first argument, else from the environment
pub fn config_path(mut args: impl Iterator<Item = String>, env: Option<String>) -> Option<PathBuf> {
    args.next().or(env).filter(|s| !s.is_empty()).map(PathBuf::from)
}
