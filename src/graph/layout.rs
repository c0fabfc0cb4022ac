//! Layered layout for reconciliation graphs
//!
//! A small layered (Sugiyama-style) layout restricted to single-root DAGs:
//! 1. Back-edges found by a depth-first walk from the root are dropped
//! 2. Each node's rank is its longest-path distance from the root
//! 3. Nodes within a rank keep graph insertion order and each rank is
//!    centered against the widest one
//! 4. Edges are routed straight or orthogonally between anchor points
//!
//! The layout is a pure function of its inputs; identical graphs and options
//! always produce identical coordinates.

use crate::graph::model::{GraphEdge, ReconciliationGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Axis along which ranks advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    TopToBottom,
    #[default]
    LeftToRight,
}

impl Direction {
    /// Parse a direction from a CLI/config friendly string
    pub fn parse_optional(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lr" | "lefttoright" | "left-to-right" => Some(Direction::LeftToRight),
            "tb" | "toptobottom" | "top-to-bottom" => Some(Direction::TopToBottom),
            _ => None,
        }
    }
}

/// How edges are drawn between ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeRouting {
    Straight,
    #[default]
    Orthogonal,
}

/// Fixed size applied to every node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

/// Parameters of a layout run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub direction: Direction,
    pub node_size: NodeSize,
    /// Gap between neighbouring nodes of the same rank
    pub node_separation: f64,
    /// Gap between consecutive ranks
    pub rank_separation: f64,
    pub edge_routing: EdgeRouting,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::LeftToRight,
            node_size: NodeSize {
                width: 650.0,
                height: 200.0,
            },
            node_separation: 50.0,
            rank_separation: 50.0,
            edge_routing: EdgeRouting::Orthogonal,
        }
    }
}

/// A point in layout coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement of one node; `x`/`y` are the node center
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rank: usize,
}

/// Routed path of one edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
}

/// Output of a layout run
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    root_id: String,
    nodes: Vec<NodeLayout>,
    edges: Vec<EdgeRoute>,
    node_index: HashMap<String, usize>,
    dropped_edges: Vec<GraphEdge>,
    width: f64,
    height: f64,
}

impl LayoutResult {
    /// Get the placement of a node by id
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.node_index.get(id).and_then(|&idx| self.nodes.get(idx))
    }

    /// Placement of the root node
    pub fn root(&self) -> Option<&NodeLayout> {
        self.node(&self.root_id)
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// All node placements in graph insertion order
    pub fn nodes(&self) -> &[NodeLayout] {
        &self.nodes
    }

    /// All routed edges in graph insertion order
    pub fn edges(&self) -> &[EdgeRoute] {
        &self.edges
    }

    /// Edges left out because they would have closed a cycle
    pub fn dropped_edges(&self) -> &[GraphEdge] {
        &self.dropped_edges
    }

    /// Node ids grouped by rank, in drawing order
    pub fn ranks(&self) -> Vec<Vec<&str>> {
        let rank_count = self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0);
        let mut ranks = vec![Vec::new(); rank_count];
        for node in &self.nodes {
            ranks[node.rank].push(node.id.as_str());
        }
        ranks
    }

    /// Total width of the drawing
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Total height of the drawing
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Errors that make a layout impossible
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("root node {0:?} is not part of the graph")]
    MissingRoot(String),

    #[error("invalid layout geometry: {0}")]
    InvalidGeometry(String),
}

/// Compute a layered layout for a reconciliation graph
pub fn layout(
    graph: &ReconciliationGraph,
    options: &LayoutOptions,
) -> Result<LayoutResult, LayoutError> {
    validate_options(options)?;

    let root = *graph
        .node_index
        .get(&graph.root_id)
        .ok_or_else(|| LayoutError::MissingRoot(graph.root_id.clone()))?;
    let count = graph.nodes.len();

    // Resolve edges to indices, skipping any with unknown endpoints
    let mut resolved: Vec<(usize, usize)> = Vec::with_capacity(graph.edges.len());
    let mut resolved_from: Vec<usize> = Vec::with_capacity(graph.edges.len());
    for (edge_idx, edge) in graph.edges.iter().enumerate() {
        match (
            graph.node_index.get(&edge.source),
            graph.node_index.get(&edge.target),
        ) {
            (Some(&s), Some(&t)) => {
                resolved.push((s, t));
                resolved_from.push(edge_idx);
            }
            _ => tracing::warn!("Skipping dangling edge {} -> {}", edge.source, edge.target),
        }
    }

    let back_edges = find_back_edges(count, root, &resolved);
    let mut kept: Vec<(usize, usize, usize)> = Vec::with_capacity(resolved.len());
    let mut dropped_edges = Vec::new();
    for (i, &(s, t)) in resolved.iter().enumerate() {
        if back_edges[i] {
            let edge = graph.edges[resolved_from[i]].clone();
            tracing::warn!("Dropping back-edge {} -> {}", edge.source, edge.target);
            dropped_edges.push(edge);
        } else {
            kept.push((s, t, resolved_from[i]));
        }
    }

    let ranks = assign_ranks(count, root, &kept);

    // Group by rank, preserving insertion order inside each rank
    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (idx, &rank) in ranks.iter().enumerate() {
        layers[rank].push(idx);
    }

    let size = options.node_size;
    let (rank_extent, cross_extent) = match options.direction {
        Direction::LeftToRight => (size.width, size.height),
        Direction::TopToBottom => (size.height, size.width),
    };
    let span = |members: usize| -> f64 {
        if members == 0 {
            0.0
        } else {
            members as f64 * cross_extent + (members - 1) as f64 * options.node_separation
        }
    };
    let max_span = layers.iter().map(|l| span(l.len())).fold(0.0, f64::max);

    let mut placed: Vec<Option<NodeLayout>> = vec![None; count];
    for (rank, members) in layers.iter().enumerate() {
        let rank_pos = rank as f64 * (rank_extent + options.rank_separation) + rank_extent / 2.0;
        let offset = (max_span - span(members.len())) / 2.0;
        for (slot, &idx) in members.iter().enumerate() {
            let cross_pos =
                offset + slot as f64 * (cross_extent + options.node_separation) + cross_extent / 2.0;
            let (x, y) = match options.direction {
                Direction::LeftToRight => (rank_pos, cross_pos),
                Direction::TopToBottom => (cross_pos, rank_pos),
            };
            placed[idx] = Some(NodeLayout {
                id: graph.nodes[idx].id.clone(),
                x,
                y,
                width: size.width,
                height: size.height,
                rank,
            });
        }
    }
    let nodes: Vec<NodeLayout> = placed.into_iter().flatten().collect();

    let edges = kept
        .iter()
        .map(|&(s, t, edge_idx)| {
            let edge = &graph.edges[edge_idx];
            EdgeRoute {
                source: edge.source.clone(),
                target: edge.target.clone(),
                points: route_edge(&nodes[s], &nodes[t], options),
            }
        })
        .collect();

    let rank_total = rank_count as f64 * rank_extent
        + rank_count.saturating_sub(1) as f64 * options.rank_separation;
    let (width, height) = match options.direction {
        Direction::LeftToRight => (rank_total, max_span),
        Direction::TopToBottom => (max_span, rank_total),
    };

    let node_index = nodes
        .iter()
        .enumerate()
        .map(|(idx, n)| (n.id.clone(), idx))
        .collect();

    tracing::debug!(
        "Laid out {} nodes over {} ranks ({:.0}x{:.0}), {} edges dropped",
        nodes.len(),
        rank_count,
        width,
        height,
        dropped_edges.len()
    );

    Ok(LayoutResult {
        root_id: graph.root_id.clone(),
        nodes,
        edges,
        node_index,
        dropped_edges,
        width,
        height,
    })
}

fn validate_options(options: &LayoutOptions) -> Result<(), LayoutError> {
    let size = options.node_size;
    if !(size.width.is_finite() && size.width > 0.0 && size.height.is_finite() && size.height > 0.0)
    {
        return Err(LayoutError::InvalidGeometry(format!(
            "node size must be positive, got {}x{}",
            size.width, size.height
        )));
    }
    for (name, value) in [
        ("node separation", options.node_separation),
        ("rank separation", options.rank_separation),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(LayoutError::InvalidGeometry(format!(
                "{} must be non-negative, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

/// Mark edges that close a cycle, or point back at the root
///
/// The walk starts at the root and then at every node it did not reach, in
/// insertion order, so the remaining edge set is acyclic.
fn find_back_edges(count: usize, root: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, &(s, _)) in edges.iter().enumerate() {
        outgoing[s].push(i);
    }

    let mut back = vec![false; edges.len()];
    for (i, &(_, t)) in edges.iter().enumerate() {
        if t == root {
            back[i] = true;
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        OnStack,
        Done,
    }
    let mut mark = vec![Mark::New; count];

    let starts = std::iter::once(root).chain((0..count).filter(|&n| n != root));
    for start in starts {
        if mark[start] != Mark::New {
            continue;
        }
        // (node, position in its outgoing list)
        let mut stack = vec![(start, 0usize)];
        mark[start] = Mark::OnStack;
        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            if pos == outgoing[node].len() {
                mark[node] = Mark::Done;
                stack.pop();
                continue;
            }
            frame.1 += 1;
            let edge = outgoing[node][pos];
            if back[edge] {
                continue;
            }
            let target = edges[edge].1;
            match mark[target] {
                Mark::New => {
                    mark[target] = Mark::OnStack;
                    stack.push((target, 0));
                }
                Mark::OnStack => back[edge] = true,
                Mark::Done => {}
            }
        }
    }

    back
}

/// Longest-path ranks over an acyclic edge set
///
/// The root has rank 0. Other nodes without a parent hang one rank below
/// the root.
fn assign_ranks(count: usize, root: usize, edges: &[(usize, usize, usize)]) -> Vec<usize> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indegree = vec![0usize; count];
    for &(s, t, _) in edges {
        outgoing[s].push(t);
        indegree[t] += 1;
    }

    let mut rank = vec![0usize; count];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for node in 0..count {
        if indegree[node] == 0 {
            rank[node] = if node == root { 0 } else { 1 };
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        for &next in &outgoing[node] {
            rank[next] = rank[next].max(rank[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    rank
}

fn route_edge(source: &NodeLayout, target: &NodeLayout, options: &LayoutOptions) -> Vec<Point> {
    let (start, end) = match options.direction {
        Direction::LeftToRight => (
            Point::new(source.x + source.width / 2.0, source.y),
            Point::new(target.x - target.width / 2.0, target.y),
        ),
        Direction::TopToBottom => (
            Point::new(source.x, source.y + source.height / 2.0),
            Point::new(target.x, target.y - target.height / 2.0),
        ),
    };

    let aligned = match options.direction {
        Direction::LeftToRight => start.y == end.y,
        Direction::TopToBottom => start.x == end.x,
    };
    if options.edge_routing == EdgeRouting::Straight || aligned {
        return vec![start, end];
    }

    match options.direction {
        Direction::LeftToRight => {
            let mid = (start.x + end.x) / 2.0;
            vec![start, Point::new(mid, start.y), Point::new(mid, end.y), end]
        }
        Direction::TopToBottom => {
            let mid = (start.y + end.y) / 2.0;
            vec![start, Point::new(start.x, mid), Point::new(end.x, mid), end]
        }
    }
}
