//! Direction-aware, filterable depth-first traversal over the graph.
//!
//! A walk starts at a root node and follows outgoing (`Descend`) or incoming
//! (`Ascend`) edges. Edge filters are applied first; the surviving neighbours
//! are tested against the caller's node-type list (matching) and against the
//! follow gate (recursion) independently.

use std::collections::BTreeSet;
use crate::graph::{Edge, EdgeType, Graph, NodeId, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow outgoing edges.
    #[default]
    Descend,
    /// Follow incoming edges.
    Ascend,
}

/// Traversal options. Empty lists mean "no restriction"; `max_depth == 0`
/// means unbounded.
#[derive(Debug, Clone, Default)]
pub struct WalkOpts {
    pub direction: Direction,
    pub follow_node_types: Vec<NodeType>,
    pub skip_node_types: Vec<NodeType>,
    pub follow_edge_types: Vec<EdgeType>,
    pub skip_edge_types: Vec<EdgeType>,
    pub skip_nodes: Vec<NodeId>,
    pub max_depth: usize,
}

impl WalkOpts {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn descend() -> Self {
        Self::new(Direction::Descend)
    }

    pub fn ascend() -> Self {
        Self::new(Direction::Ascend)
    }

    pub fn follow_node_types(mut self, types: &[NodeType]) -> Self {
        self.follow_node_types.extend_from_slice(types);
        self
    }

    pub fn skip_node_types(mut self, types: &[NodeType]) -> Self {
        self.skip_node_types.extend_from_slice(types);
        self
    }

    pub fn follow_edge_types(mut self, types: &[EdgeType]) -> Self {
        self.follow_edge_types.extend_from_slice(types);
        self
    }

    pub fn skip_edge_types(mut self, types: &[EdgeType]) -> Self {
        self.skip_edge_types.extend_from_slice(types);
        self
    }

    pub fn skip_nodes(mut self, nodes: &[NodeId]) -> Self {
        self.skip_nodes.extend_from_slice(nodes);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Neighbours one hop away that pass the edge filter and the follow gate.
    pub fn next<'g>(&self, graph: &'g Graph, node: NodeId) -> Vec<(&'g Edge, NodeId)> {
        self.filtered_edges(graph, node)
            .map(|edge| (edge, self.next_node(edge)))
            .filter(|&(_, next)| self.should_follow(graph, next))
            .collect()
    }

    fn filtered_edges<'g>(&self, graph: &'g Graph, node: NodeId) -> impl Iterator<Item = &'g Edge> {
        let ids = match self.direction {
            Direction::Descend => &graph.node(node).outgoing,
            Direction::Ascend => &graph.node(node).incoming,
        };
        ids.iter()
            .map(move |&e| graph.edge(e))
            .filter(move |edge| self.edge_allowed(edge.kind))
    }

    fn edge_allowed(&self, kind: EdgeType) -> bool {
        if self.skip_edge_types.contains(&kind) {
            return false;
        }
        self.follow_edge_types.is_empty() || self.follow_edge_types.contains(&kind)
    }

    fn next_node(&self, edge: &Edge) -> NodeId {
        match self.direction {
            Direction::Descend => edge.dst,
            Direction::Ascend => edge.src,
        }
    }

    fn should_follow(&self, graph: &Graph, node: NodeId) -> bool {
        if self.skip_nodes.contains(&node) {
            return false;
        }
        let kind = graph.node(node).kind();
        if self.skip_node_types.contains(&kind) {
            return false;
        }
        self.follow_node_types.is_empty() || self.follow_node_types.contains(&kind)
    }

    fn max_depth_reached(&self, depth: usize) -> bool {
        self.max_depth > 0 && depth >= self.max_depth
    }
}

struct Search<'w> {
    graph: &'w Graph,
    opts: &'w WalkOpts,
    types: &'w [NodeType],
    first_only: bool,
    found: Vec<NodeId>,
    /// Nodes on the current DFS path, root included.
    path: Vec<NodeId>,
}

impl Search<'_> {
    /// Returns `true` once the search is satisfied and should unwind.
    fn visit(&mut self, node: NodeId, depth: usize) -> bool {
        if self.opts.max_depth_reached(depth) {
            return false;
        }
        self.path.push(node);

        let edges: Vec<&Edge> = self.opts.filtered_edges(self.graph, node).collect();
        for edge in edges {
            let next = self.opts.next_node(edge);

            if self.types.is_empty() || self.types.contains(&self.graph.node(next).kind()) {
                self.found.push(next);
                if self.first_only {
                    return true;
                }
            }

            if self.opts.should_follow(self.graph, next) && !self.path.contains(&next) && self.visit(next, depth + 1) {
                return true;
            }
        }

        self.path.pop();
        false
    }
}

impl Graph {
    fn search(&self, root: NodeId, opts: &WalkOpts, types: &[NodeType], first_only: bool) -> Vec<NodeId> {
        if self.get_node(root).is_none() {
            return Vec::new();
        }
        let mut search = Search {
            graph: self,
            opts,
            types,
            first_only,
            found: Vec::new(),
            path: Vec::new(),
        };
        search.visit(root, 0);
        search.found
    }

    /// Every matching node in discovery order; a node reached over several
    /// paths appears once per path.
    pub fn find_all(&self, root: NodeId, opts: &WalkOpts, types: &[NodeType]) -> Vec<NodeId> {
        self.search(root, opts, types, false)
    }

    pub fn find_unique(&self, root: NodeId, opts: &WalkOpts, types: &[NodeType]) -> BTreeSet<NodeId> {
        self.search(root, opts, types, false).into_iter().collect()
    }

    /// First matching node in depth-first discovery order.
    pub fn find_first(&self, root: NodeId, opts: &WalkOpts, types: &[NodeType]) -> Option<NodeId> {
        self.search(root, opts, types, true).into_iter().next()
    }

    /// Orders nodes by label, then by id.
    pub fn sort_by_label(&self, nodes: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut sorted: Vec<NodeId> = nodes.into_iter().collect();
        sorted.sort_by(|&a, &b| {
            let (na, nb) = (self.node(a), self.node(b));
            na.label().cmp(nb.label()).then_with(|| na.id().cmp(nb.id()))
        });
        sorted
    }
}
