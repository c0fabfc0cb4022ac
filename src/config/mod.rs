//! Configuration system for fluxgraph
//!
//! Layered configuration: built-in defaults, the YAML config file, then
//! environment variable overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LayoutConfig, PaletteConfig, PollConfig, ViewportConfig};

use crate::graph::{Direction, EdgeRouting};

/// Reasons a configuration is rejected
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Check cross-field constraints that serde cannot express
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let layout = &config.layout;
    for (key, value) in [
        ("layout.nodeWidth", layout.node_width),
        ("layout.nodeHeight", layout.node_height),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(key, format!("must be positive, got {}", value)));
        }
    }
    for (key, value) in [
        ("layout.nodeSeparation", layout.node_separation),
        ("layout.rankSeparation", layout.rank_separation),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(invalid(key, format!("must be non-negative, got {}", value)));
        }
    }

    let viewport = &config.viewport;
    if viewport.min_zoom > viewport.max_zoom {
        return Err(invalid(
            "viewport.minZoom",
            format!(
                "{} is greater than maxZoom {}",
                viewport.min_zoom, viewport.max_zoom
            ),
        ));
    }
    if !(viewport.min_zoom..=viewport.max_zoom).contains(&viewport.default_zoom) {
        return Err(invalid(
            "viewport.defaultZoom",
            format!(
                "{} is outside {}..={}",
                viewport.default_zoom, viewport.min_zoom, viewport.max_zoom
            ),
        ));
    }
    if !(viewport.scale_divisor.is_finite() && viewport.scale_divisor > 0.0) {
        return Err(invalid("viewport.scaleDivisor", "must be positive"));
    }
    if !viewport.scale_offset.is_finite() || !viewport.centering_constant.is_finite() {
        return Err(invalid("viewport", "scaleOffset and centeringConstant must be finite"));
    }

    if config.poll.interval_ms == 0 {
        return Err(invalid("poll.intervalMs", "must be greater than zero"));
    }

    let palette = &config.palette;
    for (key, value) in [
        ("palette.current", &palette.current),
        ("palette.inProgress", &palette.in_progress),
        ("palette.failed", &palette.failed),
        ("palette.edge", &palette.edge),
    ] {
        if let Err(e) = csscolorparser::parse(value) {
            return Err(invalid(key, e.to_string()));
        }
    }

    Ok(())
}

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let value = match key {
        "layout.direction" => serde_yaml::to_string(&config.layout.direction)?
            .trim()
            .to_string(),
        "layout.nodeWidth" => config.layout.node_width.to_string(),
        "layout.nodeHeight" => config.layout.node_height.to_string(),
        "layout.nodeSeparation" => config.layout.node_separation.to_string(),
        "layout.rankSeparation" => config.layout.rank_separation.to_string(),
        "layout.edgeRouting" => serde_yaml::to_string(&config.layout.edge_routing)?
            .trim()
            .to_string(),
        "viewport.minZoom" => config.viewport.min_zoom.to_string(),
        "viewport.maxZoom" => config.viewport.max_zoom.to_string(),
        "viewport.defaultZoom" => config.viewport.default_zoom.to_string(),
        "viewport.scaleOffset" => config.viewport.scale_offset.to_string(),
        "viewport.scaleDivisor" => config.viewport.scale_divisor.to_string(),
        "viewport.centeringConstant" => config.viewport.centering_constant.to_string(),
        "poll.intervalMs" => config.poll.interval_ms.to_string(),
        "palette.current" => config.palette.current.clone(),
        "palette.inProgress" => config.palette.in_progress.clone(),
        "palette.failed" => config.palette.failed.clone(),
        "palette.edge" => config.palette.edge.clone(),
        _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
    };
    Ok(value)
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "layout.direction" => {
            config.layout.direction = Direction::parse_optional(value)
                .ok_or_else(|| invalid(key, "must be 'lr' or 'tb'"))?;
        }
        "layout.nodeWidth" => {
            config.layout.node_width = value.parse().context("layout.nodeWidth must be a number")?;
        }
        "layout.nodeHeight" => {
            config.layout.node_height =
                value.parse().context("layout.nodeHeight must be a number")?;
        }
        "layout.nodeSeparation" => {
            config.layout.node_separation = value
                .parse()
                .context("layout.nodeSeparation must be a number")?;
        }
        "layout.rankSeparation" => {
            config.layout.rank_separation = value
                .parse()
                .context("layout.rankSeparation must be a number")?;
        }
        "layout.edgeRouting" => {
            config.layout.edge_routing = match value.to_lowercase().as_str() {
                "straight" => EdgeRouting::Straight,
                "orthogonal" => EdgeRouting::Orthogonal,
                _ => return Err(invalid(key, "must be 'straight' or 'orthogonal'").into()),
            };
        }
        "viewport.minZoom" => {
            config.viewport.min_zoom = value.parse().context("viewport.minZoom must be a number")?;
        }
        "viewport.maxZoom" => {
            config.viewport.max_zoom = value.parse().context("viewport.maxZoom must be a number")?;
        }
        "viewport.defaultZoom" => {
            config.viewport.default_zoom = value
                .parse()
                .context("viewport.defaultZoom must be a number")?;
        }
        "viewport.scaleOffset" => {
            config.viewport.scale_offset = value
                .parse()
                .context("viewport.scaleOffset must be a number")?;
        }
        "viewport.scaleDivisor" => {
            config.viewport.scale_divisor = value
                .parse()
                .context("viewport.scaleDivisor must be a number")?;
        }
        "viewport.centeringConstant" => {
            config.viewport.centering_constant = value
                .parse()
                .context("viewport.centeringConstant must be a number")?;
        }
        "poll.intervalMs" => {
            config.poll.interval_ms = value.parse().context("poll.intervalMs must be a number")?;
        }
        "palette.current" => config.palette.current = value.to_string(),
        "palette.inProgress" => config.palette.in_progress = value.to_string(),
        "palette.failed" => config.palette.failed = value.to_string(),
        "palette.edge" => config.palette.edge = value.to_string(),
        _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
    }

    validate_config(config)?;
    Ok(())
}
