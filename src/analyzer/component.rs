use std::collections::{BTreeMap, BTreeSet};
use crate::analyzer::Analyzer;
use crate::graph::walk::WalkOpts;
use crate::graph::{EdgeType, NodeId, NodeType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentCalledBy {
    /// Actions calling the component.
    pub actions: BTreeSet<NodeId>,
    /// Components whose workflow calls the component.
    pub components: BTreeSet<NodeId>,
    /// Playbooks whose workflows call the component, with those workflows.
    pub playbook_workflows: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Analyzer<'_> {
    pub fn component_called_by(&self, component: NodeId) -> ComponentCalledBy {
        let mut result = ComponentCalledBy::default();
        let Some(node) = self.graph.get_node(component) else {
            return result;
        };

        result.actions = node
            .outgoing
            .iter()
            .map(|&e| self.graph.edge(e))
            .filter(|edge| edge.kind == EdgeType::CalledBy)
            .map(|edge| edge.dst)
            .collect();

        let workflows: BTreeSet<NodeId> = result
            .actions
            .iter()
            .filter_map(|&action| self.workflow_for_action(action))
            .collect();

        for workflow in workflows {
            if let Some(caller) = self.component_for_workflow(workflow) {
                result.components.insert(caller);
            }
            if let Some(playbook) = self.playbook_for_workflow(workflow) {
                result.playbook_workflows.entry(playbook).or_default().insert(workflow);
            }
        }

        result
    }

    /// Components called from within the component's own workflow.
    pub fn component_calls(&self, component: NodeId) -> BTreeSet<NodeId> {
        let Some(workflow) = self.workflow_for_component(component) else {
            return BTreeSet::new();
        };

        let call_actions = self
            .graph
            .find_unique(workflow, &WalkOpts::descend(), &[NodeType::ComponentAction]);
        let callee = WalkOpts::ascend().max_depth(1).follow_edge_types(&[EdgeType::CalledBy]);

        call_actions
            .into_iter()
            .filter_map(|action| self.graph.find_first(action, &callee, &[NodeType::Component]))
            .collect()
    }
}
