//! Configuration loading and catalog folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents
///
/// All fields optional; unset fields fall through to the next
/// resolution tier (environment, then compiled defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding one profile file per identity
    pub catalog_folder: Option<String>,
    /// Days an identity may go unseen before eviction
    pub expiry_days: Option<i64>,
    /// Minimum cosine similarity to treat an embedding as a returning speaker
    pub similarity_threshold: Option<f32>,
}

/// Catalog folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (value captured by the caller)
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_catalog_folder(
    cli_arg: Option<&Path>,
    env_value: Option<&str>,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = env_value {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(folder) = toml_config.catalog_folder.as_deref() {
        return PathBuf::from(folder);
    }

    // Priority 4: OS-dependent compiled default
    default_catalog_folder()
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("voicegate").join("voicegate.toml"))
}

/// Load TOML configuration from an explicit path
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the default TOML configuration, best-effort
///
/// A missing file is not an error; a present-but-unparseable file is
/// reported so a typo does not silently fall back to defaults.
pub fn load_default_toml_config() -> Result<TomlConfig> {
    match default_config_path() {
        Some(path) if path.exists() => load_toml_config(&path),
        _ => Ok(TomlConfig::default()),
    }
}

/// Get OS-dependent default catalog folder path
pub fn default_catalog_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/voicegate/voice_db (or /var/lib/voicegate for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("voicegate").join("voice_db"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/voicegate/voice_db"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/voicegate/voice_db
        dirs::data_dir()
            .map(|d| d.join("voicegate").join("voice_db"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/voicegate/voice_db"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\voicegate\voice_db
        dirs::data_local_dir()
            .map(|d| d.join("voicegate").join("voice_db"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\voicegate\\voice_db"))
    } else {
        PathBuf::from("./voicegate_data/voice_db")
    }
}

/// Create the catalog folder if missing
pub fn ensure_catalog_folder(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::Config(format!("Create catalog folder failed: {}", e)))?;
        tracing::info!(folder = %path.display(), "Created catalog folder");
    }
    Ok(())
}
