//! Configuration loading and merging logic
//!
//! Handles loading configuration from the config file and applying
//! environment overrides on top of it.

use super::{defaults, paths, schema::Config, set_config_value, validate_config};
use crate::graph::Direction;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Explicit config file, or the root config file
    /// 3. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut config = Self::load_defaults();

        match explicit {
            Some(path) => {
                config = Self::load_file(path)?;
            }
            None => {
                let root_path = paths::root_config_path();
                if root_path.exists() {
                    config = Self::load_file(&root_path)?;
                } else {
                    tracing::debug!("No config file at {}, using defaults", root_path.display());
                }
            }
        }

        config = Self::apply_env_overrides(config);
        validate_config(&config).context("Invalid configuration")?;

        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the config file (if any) and the merged result
    pub fn validate(explicit: Option<&Path>) -> Result<()> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(paths::root_config_path);
        if path.exists() {
            let config = Self::load_file(&path)?;
            validate_config(&config)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
        }

        let _ = Self::load(explicit).context("Failed to load merged configuration")?;

        Ok(())
    }

    /// Load only the file layer for editing
    ///
    /// Defaults are used when the file does not exist yet. A file that
    /// exists but does not parse is an error, and env overrides are never
    /// applied, so nothing but the edited key changes on disk.
    pub fn load_for_edit(path: &Path) -> Result<Config> {
        if path.exists() {
            Self::load_file(path)
        } else {
            tracing::debug!("No config file at {}, starting from defaults", path.display());
            Ok(Self::load_defaults())
        }
    }

    /// Set one dot-separated key in a config file and write it back
    pub fn update_file(path: &Path, key: &str, value: &str) -> Result<Config> {
        let mut config = Self::load_for_edit(path)?;
        set_config_value(&mut config, key, value)
            .with_context(|| format!("Failed to set {} = {}", key, value))?;
        validate_config(&config).context("Invalid configuration")?;
        Self::save(&config, &path.to_path_buf())?;
        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // FLUXGRAPH_DIRECTION override
        if let Ok(direction) = std::env::var("FLUXGRAPH_DIRECTION") {
            match Direction::parse_optional(&direction) {
                Some(direction) => config.layout.direction = direction,
                None => tracing::warn!("Ignoring FLUXGRAPH_DIRECTION={:?}", direction),
            }
        }

        // FLUXGRAPH_DEFAULT_ZOOM override
        if let Ok(zoom) = std::env::var("FLUXGRAPH_DEFAULT_ZOOM") {
            if let Ok(val) = zoom.parse::<u32>() {
                config.viewport.default_zoom = val;
            }
        }

        // FLUXGRAPH_POLL_INTERVAL override (milliseconds)
        if let Ok(interval) = std::env::var("FLUXGRAPH_POLL_INTERVAL") {
            if let Ok(val) = interval.parse::<u64>() {
                config.poll.interval_ms = val;
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
