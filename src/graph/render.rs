//! Render adapter contract
//!
//! The core never draws. Each frame it hands a [`DrawCommand`] (or a request
//! to show the loading placeholder) to a [`RenderAdapter`], which owns its
//! output surface from construction.

use crate::graph::label::LabelRenderer;
use crate::graph::layout::{LayoutResult, Point};
use crate::graph::model::ReconciliationGraph;
use crate::graph::viewport::Transform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A node ready to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_markup: String,
}

/// An edge ready to draw, without arrowheads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEdge {
    pub source_id: String,
    pub target_id: String,
    pub path_points: Vec<Point>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawCommand {
    pub nodes: Vec<DrawNode>,
    pub edges: Vec<DrawEdge>,
    pub transform: Transform,
}

impl DrawCommand {
    /// Combine a layout, the graph it came from and the viewport transform
    pub fn compose(
        graph: &ReconciliationGraph,
        layout: &LayoutResult,
        transform: Transform,
        labels: &dyn LabelRenderer,
    ) -> Self {
        let nodes = layout
            .nodes()
            .iter()
            .map(|placed| DrawNode {
                id: placed.id.clone(),
                x: placed.x,
                y: placed.y,
                width: placed.width,
                height: placed.height,
                label_markup: graph
                    .node(&placed.id)
                    .map(|n| labels.render(&n.payload))
                    .unwrap_or_default(),
            })
            .collect();

        let edges = layout
            .edges()
            .iter()
            .map(|route| DrawEdge {
                source_id: route.source.clone(),
                target_id: route.target.clone(),
                path_points: route.points.clone(),
            })
            .collect();

        Self {
            nodes,
            edges,
            transform,
        }
    }
}

/// Consumer of frames produced by a graph session
pub trait RenderAdapter {
    /// Draw a full frame
    fn draw(&mut self, command: &DrawCommand) -> Result<()>;

    /// Hide the draw surface and show the loading placeholder
    fn show_loading(&mut self) -> Result<()>;
}

#[derive(Serialize)]
#[serde(tag = "frame", rename_all = "camelCase")]
enum Frame<'a> {
    Loading,
    Draw(&'a DrawCommand),
}

/// Writes one JSON document per frame to an owned writer
pub struct JsonRenderAdapter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonRenderAdapter<W> {
    /// Compact output, one frame per line
    pub fn lines(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    /// Indented output
    pub fn pretty(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, frame)
        } else {
            serde_json::to_writer(&mut self.writer, frame)
        }
        .context("Failed to serialize frame")?;
        writeln!(self.writer).context("Failed to write frame")?;
        self.writer.flush().context("Failed to flush frame")?;
        Ok(())
    }
}

impl<W: Write> RenderAdapter for JsonRenderAdapter<W> {
    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        self.write_frame(&Frame::Draw(command))
    }

    fn show_loading(&mut self) -> Result<()> {
        self.write_frame(&Frame::Loading)
    }
}
