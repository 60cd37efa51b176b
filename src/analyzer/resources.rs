use std::collections::HashSet;
use crate::analyzer::Analyzer;
use crate::dump::{Application, PlaybookAction, Workflow};
use crate::graph::{EdgeType, NodeId};

/// Edges between siblings of the same action map.
const SIBLING_EDGES: [EdgeType; 5] = [
    EdgeType::OnSuccess,
    EdgeType::OnFailure,
    EdgeType::OnComplete,
    EdgeType::If,
    EdgeType::Else,
];

impl<'a> Analyzer<'a> {
    /// Raw workflow behind a workflow node.
    pub fn workflow_resource(&self, workflow: NodeId) -> Option<&'a Workflow> {
        let node = self.graph.get_node(workflow)?;
        self.state.workflows_by_id.get(node.id())
    }

    pub fn application_resource(&self, app: NodeId) -> Option<&'a Application> {
        let node = self.graph.get_node(app)?;
        self.state.applications_by_id.get(node.id())
    }

    /// Raw action behind an action node of `workflow`.
    ///
    /// The loop and parallel containers between the workflow and the action
    /// are taken from the graph, so actions sharing an id at different
    /// nesting levels resolve to their own definitions.
    pub fn action_resource(&self, workflow: NodeId, action: NodeId) -> Option<&'a PlaybookAction> {
        let wf = self.workflow_resource(workflow)?;
        let action_id = self.graph.get_node(action)?.id();

        // 1. Containers from the action outwards, up to the workflow
        let mut path = Vec::new();
        let mut current = self.container_of(action)?;
        while current != workflow {
            path.push(current);
            current = self.container_of(current)?;
        }

        // 2. Descend through the nested action maps
        let mut actions = &wf.playbook.actions;
        for &container in path.iter().rev() {
            actions = &actions.get(self.graph.node(container).id())?.actions;
        }
        actions.get(action_id)
    }

    /// Workflow, loop or parallel group node whose action map holds `action`.
    fn container_of(&self, action: NodeId) -> Option<NodeId> {
        let mut seen = HashSet::from([action]);
        let mut stack = vec![action];
        while let Some(node) = stack.pop() {
            for edge in self.graph.in_edges(node) {
                match edge.kind {
                    EdgeType::Entrypoint | EdgeType::Unreachable => return Some(edge.src),
                    kind if SIBLING_EDGES.contains(&kind) => {
                        if seen.insert(edge.src) {
                            stack.push(edge.src);
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }
}
