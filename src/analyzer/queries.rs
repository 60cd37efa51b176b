use std::collections::BTreeSet;
use crate::analyzer::Analyzer;
use crate::graph::walk::WalkOpts;
use crate::graph::{EdgeType, NodeId, NodeType};

/// Edge types through which one resource refers to another.
pub const REFERENCE_EDGES: [EdgeType; 5] = [
    EdgeType::AccessedBy,
    EdgeType::HasAction,
    EdgeType::CalledBy,
    EdgeType::EmittedBy,
    EdgeType::HasEvent,
];

fn one_hop_over(edge: EdgeType, ascend: bool) -> WalkOpts {
    let opts = if ascend { WalkOpts::ascend() } else { WalkOpts::descend() };
    opts.max_depth(1).follow_edge_types(&[edge])
}

impl Analyzer<'_> {
    pub fn playbook_for_workflow(&self, workflow: NodeId) -> Option<NodeId> {
        self.graph
            .find_first(workflow, &one_hop_over(EdgeType::Workflow, true), &[NodeType::Playbook])
    }

    pub fn component_for_workflow(&self, workflow: NodeId) -> Option<NodeId> {
        self.graph
            .find_first(workflow, &one_hop_over(EdgeType::Workflow, true), &[NodeType::Component])
    }

    pub fn workflow_for_component(&self, component: NodeId) -> Option<NodeId> {
        self.graph
            .find_first(component, &one_hop_over(EdgeType::Workflow, false), &[NodeType::Workflow])
    }

    /// Workflows of a playbook, in the playbook's own order.
    pub fn workflows_for_playbook(&self, playbook: NodeId) -> Vec<NodeId> {
        self.graph
            .find_all(playbook, &one_hop_over(EdgeType::Workflow, false), &[NodeType::Workflow])
    }

    /// Nearest workflow above an action, over any edge type.
    pub fn workflow_for_action(&self, action: NodeId) -> Option<NodeId> {
        self.graph.find_first(action, &WalkOpts::ascend(), &[NodeType::Workflow])
    }

    pub fn workflow_for_trigger(&self, trigger: NodeId) -> Option<NodeId> {
        self.graph
            .find_first(trigger, &one_hop_over(EdgeType::TriggersWorkflow, false), &[NodeType::Workflow])
    }

    pub fn triggers_for_workflow(&self, workflow: NodeId) -> BTreeSet<NodeId> {
        self.graph
            .find_unique(workflow, &one_hop_over(EdgeType::TriggersWorkflow, true), &[])
    }

    pub fn entrypoints_for_workflow(&self, workflow: NodeId) -> BTreeSet<NodeId> {
        self.graph
            .find_unique(workflow, &one_hop_over(EdgeType::Entrypoint, false), &[])
    }

    pub fn component_for_action(&self, action: NodeId) -> Option<NodeId> {
        self.graph
            .find_first(action, &one_hop_over(EdgeType::CalledBy, true), &[NodeType::Component])
    }

    /// Resources that refer to `node` directly.
    pub fn references(&self, node: NodeId) -> BTreeSet<NodeId> {
        let opts = WalkOpts::ascend().max_depth(1).follow_edge_types(&REFERENCE_EDGES);
        self.graph.find_unique(node, &opts, &[])
    }
}
