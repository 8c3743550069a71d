/// Editor configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use editor3d_history::HistoryConfig;

use crate::color::Color;

/// File name used next to the executable and in the user config dir.
const CONFIG_FILE_NAME: &str = "editor3d.json";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "EDITOR3D_CONFIG";

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept per session. `None` or 0 = unlimited.
    pub max_history_depth: Option<usize>,
    /// Color given to newly created objects.
    pub default_color: Color,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Whether the shell echoes each command before its output.
    pub echo_commands: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_depth: None,
            default_color: Color::DEFAULT_OBJECT,
            log_filter: "info".to_string(),
            echo_commands: false,
        }
    }
}

impl EditorConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `EDITOR3D_CONFIG` environment variable
    /// 2. `editor3d.json` next to the executable, if that file exists
    /// 3. `editor3d/editor3d.json` in the user config directory
    /// 4. `editor3d.json` next to the executable
    /// 5. `editor3d.json` in the working directory
    pub fn config_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));
        resolve_config_path(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            exe_dir.as_deref(),
            dirs::config_dir().as_deref(),
        )
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    ///
    /// Never fails: on any error (unreadable file, parse error, unwritable
    /// directory) the defaults are returned together with the error, so the
    /// caller can report it once logging is up.
    pub fn load_or_create(path: &Path) -> (Self, Option<anyhow::Error>) {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => (config, None),
                // Don't overwrite a broken file
                Err(e) => (Self::default(), Some(e)),
            }
        } else {
            let config = Self::default();
            let problem = config
                .save(path)
                .context("Failed to create default config")
                .err();
            (config, problem)
        }
    }

    /// Reads and sanitizes the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let mut config: EditorConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.sanitize();
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config at {}", path.display()))
    }

    /// Resets invalid fields to their defaults.
    pub fn sanitize(&mut self) {
        if self.max_history_depth == Some(0) {
            self.max_history_depth = None;
        }
        let filter = self.log_filter.trim();
        if filter.is_empty() {
            self.log_filter = "info".to_string();
        } else if filter.len() != self.log_filter.len() {
            self.log_filter = filter.to_string();
        }
    }

    /// History limits derived from this config.
    pub fn history(&self) -> HistoryConfig {
        self.max_history_depth
            .map(HistoryConfig::with_max_depth)
            .unwrap_or_default()
    }
}

fn resolve_config_path(
    from_env: Option<PathBuf>,
    exe_dir: Option<&Path>,
    user_config_dir: Option<&Path>,
) -> PathBuf {
    if let Some(path) = from_env {
        return path;
    }
    let beside_exe = exe_dir.map(|d| d.join(CONFIG_FILE_NAME));
    if let Some(path) = beside_exe.as_ref().filter(|p| p.exists()) {
        return path.clone();
    }
    user_config_dir
        .map(|d| d.join("editor3d").join(CONFIG_FILE_NAME))
        .or(beside_exe)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
