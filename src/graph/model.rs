//! Graph data structures for reconciliation graphs
//!
//! [`build`] turns the flat object list delivered on a poll tick into a
//! single-root graph. Malformed input never fails the build: offending
//! entries are dropped or re-attached to the root and recorded as
//! [`ModelIssue`]s on the graph.

use crate::models::{ObjectStatus, ReconciledObject, RootDescriptor};
use std::collections::HashMap;

/// Application data carried by a node and handed to label renderers
#[derive(Debug, Clone, PartialEq)]
pub struct NodePayload {
    /// Resource kind
    pub kind: String,
    /// Resource name
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Status resolved at build time
    pub status: ObjectStatus,
    /// Whether reconciliation is suspended
    pub suspended: bool,
}

/// A node in the reconciliation graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Unique identifier for the node
    pub id: String,
    pub payload: NodePayload,
    /// True only for the automation object being visualized
    pub is_root: bool,
}

/// An edge from a parent to the object it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    /// Parent node ID
    pub source: String,
    /// Child node ID
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Input problems recovered while building a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelIssue {
    #[error("object at position {position} has no id")]
    MissingId { position: usize },

    #[error("duplicate node id {id:?}")]
    DuplicateId { id: String },

    #[error("node {id:?} references unknown parent {parent:?}")]
    DanglingParent { id: String, parent: String },

    #[error("parent link {parent:?} -> {id:?} closes a cycle")]
    ParentCycle { id: String, parent: String },
}

/// A graph of one automation object and the resources it reconciles
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationGraph {
    /// Id of the root node
    pub root_id: String,
    /// All nodes, root first, then objects in input order
    pub nodes: Vec<GraphNode>,
    /// All edges in insertion order
    pub edges: Vec<GraphEdge>,
    /// Map from node ID to index in nodes vector
    pub node_index: HashMap<String, usize>,
    /// Problems found in the input this graph was built from
    pub issues: Vec<ModelIssue>,
}

impl ReconciliationGraph {
    /// Create a graph holding only the root node
    pub fn with_root(root: GraphNode) -> Self {
        let mut graph = Self {
            root_id: root.id.clone(),
            nodes: Vec::new(),
            edges: Vec::new(),
            node_index: HashMap::new(),
            issues: Vec::new(),
        };
        graph.add_node(root);
        graph
    }

    /// Add a node to the graph
    ///
    /// Returns false and leaves the graph unchanged if the id is taken.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge to the graph
    ///
    /// Returns false and drops the edge if either endpoint is unknown.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if !self.node_index.contains_key(&edge.source) || !self.node_index.contains_key(&edge.target)
        {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).and_then(|&idx| self.nodes.get(idx))
    }

    /// The root node
    pub fn root(&self) -> Option<&GraphNode> {
        self.node(&self.root_id)
    }

    /// True when nothing but the root is present (still loading or nothing
    /// reconciled yet)
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.is_root)
    }

    /// Number of non-root nodes
    pub fn object_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_root).count()
    }

    /// Whether another graph has the same node ids and edges, in the same order
    pub fn same_topology(&self, other: &ReconciliationGraph) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.edges == other.edges
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.id == b.id)
    }
}

/// Build a reconciliation graph from one poll tick's objects
///
/// Every accepted object gets exactly one incoming edge: from its declared
/// parent when that parent is present, otherwise from the root.
pub fn build(objects: &[ReconciledObject], root: &RootDescriptor) -> ReconciliationGraph {
    match root.automation_kind() {
        Some(kind) => tracing::debug!("Building {} graph for {}", kind, root.name),
        None => tracing::debug!("Root {} has non-automation kind {:?}", root.name, root.kind),
    }
    let mut graph = ReconciliationGraph::with_root(GraphNode {
        id: root.name.clone(),
        payload: NodePayload {
            kind: root.display_kind().to_string(),
            name: root.name.clone(),
            namespace: root.namespace.clone(),
            status: root.resolved_status(),
            suspended: root.suspended,
        },
        is_root: true,
    });

    // Declared parent id per accepted node, parallel to graph.nodes
    let mut declared: Vec<Option<&str>> = vec![None];

    for (position, obj) in objects.iter().enumerate() {
        if obj.id.is_empty() {
            graph.issues.push(ModelIssue::MissingId { position });
            continue;
        }
        let node = GraphNode {
            id: obj.id.clone(),
            payload: NodePayload {
                kind: obj.effective_kind().to_string(),
                name: obj.name.clone(),
                namespace: obj.namespace.clone(),
                status: ObjectStatus::resolve(&obj.status, obj.suspended),
                suspended: obj.suspended,
            },
            is_root: false,
        };
        if graph.add_node(node) {
            declared.push(obj.parent());
        } else {
            graph.issues.push(ModelIssue::DuplicateId { id: obj.id.clone() });
        }
    }

    // Resolve parent links to node indices; unknown parents fall back to root
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(graph.nodes.len());
    for (idx, parent) in declared.iter().enumerate() {
        if idx == 0 {
            parents.push(None);
            continue;
        }
        let resolved = match parent {
            None => 0,
            Some(p) => match graph.node_index.get(*p) {
                Some(&parent_idx) => parent_idx,
                None => {
                    graph.issues.push(ModelIssue::DanglingParent {
                        id: graph.nodes[idx].id.clone(),
                        parent: p.to_string(),
                    });
                    0
                }
            },
        };
        parents.push(Some(resolved));
    }

    break_parent_cycles(&mut graph, &mut parents);

    for idx in 1..graph.nodes.len() {
        let parent_idx = parents[idx].unwrap_or(0);
        let edge = GraphEdge::new(graph.nodes[parent_idx].id.clone(), graph.nodes[idx].id.clone());
        graph.add_edge(edge);
    }

    for issue in &graph.issues {
        tracing::warn!("Graph for {}: {}", graph.root_id, issue);
    }
    tracing::debug!(
        "Built graph for {} with {} nodes, {} edges, {} issues",
        graph.root_id,
        graph.nodes.len(),
        graph.edges.len(),
        graph.issues.len()
    );

    graph
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    OnPath,
    Done,
}

/// Walk each node's parent chain in input order, re-attaching the node
/// whose parent link closes a cycle to the root
fn break_parent_cycles(graph: &mut ReconciliationGraph, parents: &mut [Option<usize>]) {
    let mut state = vec![Visit::New; parents.len()];
    state[0] = Visit::Done;

    for start in 1..parents.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut current = start;
        loop {
            match state[current] {
                Visit::Done => break,
                Visit::OnPath => {
                    // The last node on the path points back into the path
                    if let Some(&closing) = path.last() {
                        graph.issues.push(ModelIssue::ParentCycle {
                            id: graph.nodes[closing].id.clone(),
                            parent: graph.nodes[current].id.clone(),
                        });
                        parents[closing] = Some(0);
                    }
                    break;
                }
                Visit::New => {
                    state[current] = Visit::OnPath;
                    path.push(current);
                    match parents[current] {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
            }
        }
        for idx in path {
            state[idx] = Visit::Done;
        }
    }
}
