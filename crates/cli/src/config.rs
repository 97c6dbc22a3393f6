use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_ENV: &str = "LOCVIEW_CONFIG";
const APP_DIR: &str = "locview";
const CONFIG_FILE: &str = "config.json";
const DICT_FILE: &str = "localize_dump.json";

/// Persisted user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Game install root (contains `meta`, `master/` and `dat/`).
    #[serde(default)]
    pub game_path: String,

    /// Directory holding translation dumps.
    #[serde(default)]
    pub translation_path: String,

    /// Helper process fronting the database and extraction engines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bridge_command: Vec<String>,

    /// Extra labels for master text categories, keyed by category id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub text_data_categories: BTreeMap<String, String>,
}

impl AppConfig {
    pub fn game_path(&self) -> Result<&Path> {
        if self.game_path.trim().is_empty() {
            anyhow::bail!("game path is not configured (run `locview config --game-path <dir>`)");
        }
        Ok(Path::new(&self.game_path))
    }

    pub fn translation_path(&self) -> Result<&Path> {
        if self.translation_path.trim().is_empty() {
            anyhow::bail!(
                "translation path is not configured (run `locview config --translation-path <dir>`)"
            );
        }
        Ok(Path::new(&self.translation_path))
    }

    /// `{translation_path}/localize_dump.json`.
    pub fn dictionary_path(&self) -> Result<PathBuf> {
        Ok(self.translation_path()?.join(DICT_FILE))
    }
}

/// JSON file backing [`AppConfig`]. The workspace state lives next to it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `--config` flag, then `LOCVIEW_CONFIG`, then the platform config dir.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::new(path);
        }
        let dir = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".locview"));
        Self::new(dir.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Missing file means defaults.
    pub async fn load(&self) -> Result<AppConfig> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", self.path.display());
                return Ok(AppConfig::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Cannot read config {}", self.path.display()))
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Config {} is not valid JSON", self.path.display()))
    }

    pub async fn save(&self, config: &AppConfig) -> Result<()> {
        fs::create_dir_all(self.dir())
            .await
            .with_context(|| format!("Cannot create config dir {}", self.dir().display()))?;
        let bytes = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Cannot write config {}", self.path.display()))
    }
}
