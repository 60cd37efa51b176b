pub mod actions;
pub mod linker;
pub mod reflect;
pub mod resources;
pub mod triggers;
pub mod walk;
pub mod warnings;

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use crate::error::GraphError;

pub use linker::build_graph;
pub use warnings::{Warning, Warnings};

/// Index of a node in the graph arena.
pub type NodeId = usize;
/// Index of an edge in the graph arena.
pub type EdgeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    // Top-level resources
    Application,
    Component,
    Playbook,
    Connector,
    Workflow,

    // Triggers
    FlowEvent,
    Webhook,
    PlaybookButton,
    RecordEvent,
    CronEvent,

    // Actions
    RecordAction,
    RecordCreateAction,
    RecordSearchAction,
    RecordUpdateAction,
    RecordDeleteAction,
    RecordUpsertAction,
    RecordExportAction,
    ConnectorAction,
    ComponentAction,
    EmitEventAction,
    TransformationAction,
    WhileLoopAction,
    ForEachLoopAction,
    PythonAction,
    CreateVarsAction,
    UpdateVarsAction,
    ParallelAction,
    ConditionAction,
    HttpAction,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Application => "application",
            NodeType::Component => "component",
            NodeType::Playbook => "playbook",
            NodeType::Connector => "connector",
            NodeType::Workflow => "workflow",
            NodeType::FlowEvent => "flow_event",
            NodeType::Webhook => "webhook",
            NodeType::PlaybookButton => "playbook_button",
            NodeType::RecordEvent => "record_event",
            NodeType::CronEvent => "cron_event",
            NodeType::RecordAction => "record_action",
            NodeType::RecordCreateAction => "record_create_action",
            NodeType::RecordSearchAction => "record_search_action",
            NodeType::RecordUpdateAction => "record_update_action",
            NodeType::RecordDeleteAction => "record_delete_action",
            NodeType::RecordUpsertAction => "record_upsert_action",
            NodeType::RecordExportAction => "record_export_action",
            NodeType::ConnectorAction => "connector_action",
            NodeType::ComponentAction => "component_action",
            NodeType::EmitEventAction => "emit_event_action",
            NodeType::TransformationAction => "transformation_action",
            NodeType::WhileLoopAction => "while_loop_action",
            NodeType::ForEachLoopAction => "for_each_loop_action",
            NodeType::PythonAction => "python_action",
            NodeType::CreateVarsAction => "create_vars_action",
            NodeType::UpdateVarsAction => "update_vars_action",
            NodeType::ParallelAction => "parallel_action",
            NodeType::ConditionAction => "condition_action",
            NodeType::HttpAction => "http_action",
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            NodeType::FlowEvent
                | NodeType::Webhook
                | NodeType::PlaybookButton
                | NodeType::RecordEvent
                | NodeType::CronEvent
        )
    }

    pub fn is_action(&self) -> bool {
        !self.is_trigger()
            && !matches!(
                self,
                NodeType::Application
                    | NodeType::Component
                    | NodeType::Playbook
                    | NodeType::Connector
                    | NodeType::Workflow
            )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    EmittedBy,
    CalledBy,
    AccessedBy,
    TriggersWorkflow,
    HasEvent,
    HasAction,
    Workflow,
    Entrypoint,
    Unreachable,
    OnSuccess,
    OnFailure,
    OnComplete,
    Else,
    If,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::EmittedBy => "emitted_by",
            EdgeType::CalledBy => "called_by",
            EdgeType::AccessedBy => "accessed_by",
            EdgeType::TriggersWorkflow => "triggers_workflow",
            EdgeType::HasEvent => "has_event",
            EdgeType::HasAction => "has_action",
            EdgeType::Workflow => "workflow",
            EdgeType::Entrypoint => "entrypoint",
            EdgeType::Unreachable => "unreachable",
            EdgeType::OnSuccess => "on_success",
            EdgeType::OnFailure => "on_failure",
            EdgeType::OnComplete => "on_complete",
            EdgeType::Else => "else",
            EdgeType::If => "if",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    /// Resource id, or action id (unique only within its action chain).
    pub id: String,
    pub kind: NodeType,
    pub label: String,
    pub description: String,
}

impl Meta {
    pub fn new(id: impl Into<String>, kind: NodeType, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub meta: Meta,
    /// Edges where this node is the source, in creation order.
    pub outgoing: Vec<EdgeId>,
    /// Edges where this node is the destination, in creation order.
    pub incoming: Vec<EdgeId>,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn kind(&self) -> NodeType {
        self.meta.kind
    }

    pub fn label(&self) -> &str {
        &self.meta.label
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub kind: EdgeType,
    pub label: Option<String>,
}

/// Lookup tables for the resource roots of the graph.
#[derive(Debug, Clone, Default)]
pub struct ResourceNodes {
    pub apps_by_id: BTreeMap<String, NodeId>,
    pub components_by_id: BTreeMap<String, NodeId>,
    pub playbooks_by_id: BTreeMap<String, NodeId>,
    /// Keyed by connector manifest name.
    pub connectors_by_id: BTreeMap<String, NodeId>,
    /// Populated once triggers are linked.
    pub triggers_by_id: BTreeMap<String, NodeId>,
}

/// Append-only arena of nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    pub resources: ResourceNodes,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, meta: Meta) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            meta,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        id
    }

    /// Creates an edge and registers it on both endpoints.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, kind: EdgeType) -> Result<EdgeId, GraphError> {
        self.add_labeled_edge(src, dst, kind, None)
    }

    pub fn add_labeled_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        kind: EdgeType,
        label: Option<String>,
    ) -> Result<EdgeId, GraphError> {
        let node_count = self.nodes.len();
        if src >= node_count || dst >= node_count {
            return Err(GraphError::DanglingEdge { src, dst, node_count });
        }

        let id = self.edges.len();
        self.edges.push(Edge { src, dst, kind, label });
        self.nodes[src].outgoing.push(id);
        self.nodes[dst].incoming.push(id);
        Ok(id)
    }

    /// Panics if `id` was not produced by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Panics if `id` was not produced by this graph.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes[id].outgoing.iter().map(move |&e| &self.edges[e])
    }

    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.nodes[id].incoming.iter().map(move |&e| &self.edges[e])
    }

    pub fn edges_of_kind(&self, kind: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn nodes_of_kind(&self, kind: NodeType) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.meta.kind == kind)
            .map(|(id, _)| id)
    }
}
