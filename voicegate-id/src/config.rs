//! Configuration resolution for voicegate-id
//!
//! Multi-tier resolution with CLI → ENV → TOML → default priority for
//! each recognized option.

use std::path::{Path, PathBuf};
use tracing::warn;
use voicegate_common::config::{self, TomlConfig};
use voicegate_common::{Error, Result};

/// Environment variable naming the catalog folder
pub const ENV_CATALOG_FOLDER: &str = "VOICEGATE_CATALOG_FOLDER";
/// Environment variable overriding the expiry window
pub const ENV_EXPIRY_DAYS: &str = "VOICEGATE_EXPIRY_DAYS";
/// Environment variable overriding the similarity threshold
pub const ENV_SIMILARITY_THRESHOLD: &str = "VOICEGATE_SIMILARITY_THRESHOLD";

/// Days an identity may go unseen before the startup sweep removes it
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;
/// Minimum cosine similarity for a returning-speaker match
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.35;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct IdConfig {
    /// Folder holding one profile file per identity
    pub catalog_folder: PathBuf,
    /// Eviction window in days (inclusive boundary)
    pub expiry_days: i64,
    /// Strict lower bound for a match
    pub similarity_threshold: f32,
}

/// Command-line overrides, highest priority tier
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub catalog_folder: Option<PathBuf>,
    pub expiry_days: Option<i64>,
    pub similarity_threshold: Option<f32>,
}

/// Environment overrides, second priority tier
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub catalog_folder: Option<String>,
    pub expiry_days: Option<String>,
    pub similarity_threshold: Option<String>,
}

impl EnvOverrides {
    /// Capture the recognized variables from the process environment
    pub fn from_process() -> Self {
        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        Self {
            catalog_folder: non_empty(ENV_CATALOG_FOLDER),
            expiry_days: non_empty(ENV_EXPIRY_DAYS),
            similarity_threshold: non_empty(ENV_SIMILARITY_THRESHOLD),
        }
    }
}

impl IdConfig {
    /// Resolve configuration from CLI, environment, and the default
    /// TOML config file
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let toml_config = config::load_default_toml_config()?;
        Self::resolve_from(cli, &EnvOverrides::from_process(), &toml_config)
    }

    /// Resolve from explicit tiers (separated for testability)
    pub fn resolve_from(
        cli: &CliOverrides,
        env: &EnvOverrides,
        toml_config: &TomlConfig,
    ) -> Result<Self> {
        let catalog_folder = resolve_folder(cli.catalog_folder.as_deref(), env, toml_config);

        let expiry_days = match (&cli.expiry_days, &env.expiry_days, toml_config.expiry_days) {
            (Some(days), _, _) => *days,
            (None, Some(raw), _) => raw.parse::<i64>().map_err(|_| {
                Error::Config(format!("{} must be an integer, got {:?}", ENV_EXPIRY_DAYS, raw))
            })?,
            (None, None, Some(days)) => days,
            (None, None, None) => DEFAULT_EXPIRY_DAYS,
        };

        let similarity_threshold = match (
            &cli.similarity_threshold,
            &env.similarity_threshold,
            toml_config.similarity_threshold,
        ) {
            (Some(threshold), _, _) => *threshold,
            (None, Some(raw), _) => raw.parse::<f32>().map_err(|_| {
                Error::Config(format!(
                    "{} must be a number, got {:?}",
                    ENV_SIMILARITY_THRESHOLD, raw
                ))
            })?,
            (None, None, Some(threshold)) => threshold,
            (None, None, None) => DEFAULT_SIMILARITY_THRESHOLD,
        };

        let config = Self {
            catalog_folder,
            expiry_days,
            similarity_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.expiry_days < 0 {
            return Err(Error::Config(format!(
                "expiry_days must be >= 0, got {}",
                self.expiry_days
            )));
        }
        if !self.similarity_threshold.is_finite()
            || !(-1.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(Error::Config(format!(
                "similarity_threshold must be within [-1.0, 1.0], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Resolve the catalog folder, warning when more than one tier names one
/// (potential misconfiguration — the highest-priority source wins)
fn resolve_folder(
    cli_folder: Option<&Path>,
    env: &EnvOverrides,
    toml_config: &TomlConfig,
) -> PathBuf {
    let mut sources = Vec::new();
    if cli_folder.is_some() {
        sources.push("command line");
    }
    if env.catalog_folder.is_some() {
        sources.push("environment");
    }
    if toml_config.catalog_folder.is_some() {
        sources.push("TOML");
    }
    if sources.len() > 1 {
        warn!(
            "Catalog folder configured in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    config::resolve_catalog_folder(cli_folder, env.catalog_folder.as_deref(), toml_config)
}
