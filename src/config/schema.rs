//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::graph::{
    Direction, EdgeRouting, LayoutOptions, NodeSize, StatusPalette, ViewportSettings,
};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Layout configuration
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Zoom and pan configuration
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Polling configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Status colors
    #[serde(default)]
    pub palette: PaletteConfig,
}

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Axis along which ranks advance
    #[serde(default)]
    pub direction: Direction,

    /// Width of every node
    #[serde(default = "default_node_width")]
    pub node_width: f64,

    /// Height of every node
    #[serde(default = "default_node_height")]
    pub node_height: f64,

    /// Gap between nodes of the same rank
    #[serde(default = "default_separation")]
    pub node_separation: f64,

    /// Gap between ranks
    #[serde(default = "default_separation")]
    pub rank_separation: f64,

    /// Straight or orthogonal edges
    #[serde(default)]
    pub edge_routing: EdgeRouting,
}

/// Viewport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewportConfig {
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u32,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,

    /// Zoom used when a session starts
    #[serde(default = "default_min_zoom")]
    pub default_zoom: u32,

    /// scale = (zoom + scaleOffset) / scaleDivisor
    #[serde(default = "default_scale_offset")]
    pub scale_offset: f64,

    #[serde(default = "default_scale_divisor")]
    pub scale_divisor: f64,

    /// Pan shift per zoom percent when centering the root
    #[serde(default = "default_centering_constant")]
    pub centering_constant: f64,
}

/// Poll configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    /// Interval between fetches in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Palette configuration (any CSS color syntax)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaletteConfig {
    #[serde(default = "default_current_color")]
    pub current: String,

    #[serde(default = "default_in_progress_color")]
    pub in_progress: String,

    #[serde(default = "default_failed_color")]
    pub failed: String,

    #[serde(default = "default_edge_color")]
    pub edge: String,
}

// Default value functions
fn default_node_width() -> f64 {
    650.0
}

fn default_node_height() -> f64 {
    200.0
}

fn default_separation() -> f64 {
    50.0
}

fn default_min_zoom() -> u32 {
    0
}

fn default_max_zoom() -> u32 {
    100
}

fn default_scale_offset() -> f64 {
    20.0
}

fn default_scale_divisor() -> f64 {
    100.0
}

fn default_centering_constant() -> f64 {
    20.0
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_current_color() -> String {
    "#27AE60".to_string()
}

fn default_in_progress_color() -> String {
    "#F2994A".to_string()
}

fn default_failed_color() -> String {
    "#BC381D".to_string()
}

fn default_edge_color() -> String {
    "#737373".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_width: default_node_width(),
            node_height: default_node_height(),
            node_separation: default_separation(),
            rank_separation: default_separation(),
            edge_routing: EdgeRouting::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            default_zoom: default_min_zoom(),
            scale_offset: default_scale_offset(),
            scale_divisor: default_scale_divisor(),
            centering_constant: default_centering_constant(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            current: default_current_color(),
            in_progress: default_in_progress_color(),
            failed: default_failed_color(),
            edge: default_edge_color(),
        }
    }
}

impl LayoutConfig {
    pub fn to_options(&self) -> LayoutOptions {
        LayoutOptions {
            direction: self.direction,
            node_size: NodeSize {
                width: self.node_width,
                height: self.node_height,
            },
            node_separation: self.node_separation,
            rank_separation: self.rank_separation,
            edge_routing: self.edge_routing,
        }
    }
}

impl ViewportConfig {
    pub fn to_settings(&self) -> ViewportSettings {
        ViewportSettings {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            default_zoom: self.default_zoom,
            scale_offset: self.scale_offset,
            scale_divisor: self.scale_divisor,
            centering_constant: self.centering_constant,
        }
    }
}

impl PaletteConfig {
    pub fn to_palette(&self) -> Result<StatusPalette, csscolorparser::ParseColorError> {
        StatusPalette::parse(&self.current, &self.in_progress, &self.failed, &self.edge)
    }
}
