use std::collections::BTreeMap;
use tracing::{debug, info};
use crate::dump::LaneState;
use crate::error::GraphError;
use crate::graph::actions::ActionChainer;
use crate::graph::{resources, triggers};
use crate::graph::{EdgeType, Graph, Meta, NodeId, NodeType, Warning, Warnings};

/// Builds the resource graph of a snapshot.
///
/// Malformed or dangling references in the snapshot become [`Warning`]s and
/// the graph is built around them; an `Err` means the graph itself ended up
/// structurally inconsistent.
pub fn build_graph(state: &LaneState) -> Result<(Graph, Vec<Warning>), GraphError> {
    let mut graph = Graph::new();
    let mut warns = Warnings::new();

    // 1. Resource roots
    graph.resources = resources::create_nodes(&mut graph, state);
    debug!(
        apps = graph.resources.apps_by_id.len(),
        components = graph.resources.components_by_id.len(),
        playbooks = graph.resources.playbooks_by_id.len(),
        connectors = graph.resources.connectors_by_id.len(),
        "resource nodes created"
    );

    // 2. Workflows under their playbooks and components
    let workflows = link_workflows(&mut graph, &mut warns, state)?;
    debug!(linked = workflows.len(), total = state.workflows_by_id.len(), "workflows linked");

    // 3. Triggers
    graph.resources.triggers_by_id = triggers::link_triggers(&mut graph, &mut warns, state, &workflows)?;
    debug!(triggers = graph.resources.triggers_by_id.len(), "triggers linked");

    // 4. Action chains, once per linked workflow
    for (wf_id, &wf_node) in &workflows {
        let Some(wf) = state.workflows_by_id.get(wf_id) else {
            continue;
        };
        ActionChainer::new(&mut graph, &mut warns)
            .chain_actions(wf_node, &wf.playbook.actions, &wf.playbook.entrypoints)
            .map_err(|e| GraphError::Chain {
                container: wf_id.clone(),
                source: Box::new(e),
            })?;
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        warnings = warns.len(),
        "graph built"
    );

    Ok((graph, warns.into_vec()))
}

/// Creates the workflow nodes reachable from a playbook or component and
/// links them to their container. Workflows nobody references are reported
/// as orphans and left out.
fn link_workflows(
    graph: &mut Graph,
    warns: &mut Warnings,
    state: &LaneState,
) -> Result<BTreeMap<String, NodeId>, GraphError> {
    let mut workflows: BTreeMap<String, NodeId> = BTreeMap::new();

    for (pb_id, pb) in &state.playbooks_by_id {
        let Some(&pb_node) = graph.resources.playbooks_by_id.get(pb_id) else {
            continue;
        };

        for (idx, wf_id) in pb.playbook_ids.iter().enumerate() {
            let Some(wf) = state.workflows_by_id.get(wf_id) else {
                warns.add(Warning::UnknownWorkflow {
                    container_kind: NodeType::Playbook,
                    container_id: pb_id.clone(),
                    workflow_id: wf_id.clone(),
                });
                continue;
            };

            // Workflows whose title was never customised are shown by position.
            let label = if wf.playbook.title == wf.playbook.name {
                format!("Flow {}", idx + 1)
            } else {
                wf.playbook.title.clone()
            };
            let meta = Meta::new(wf_id, NodeType::Workflow, label, &wf.playbook.description);
            link_workflow(graph, warns, &mut workflows, pb_node, meta)?;
        }
    }

    for (comp_id, comp) in &state.components_by_id {
        let Some(&comp_node) = graph.resources.components_by_id.get(comp_id) else {
            continue;
        };

        let wf_id = &comp.playbook_id;
        let Some(wf) = state.workflows_by_id.get(wf_id) else {
            warns.add(Warning::UnknownWorkflow {
                container_kind: NodeType::Component,
                container_id: comp_id.clone(),
                workflow_id: wf_id.clone(),
            });
            continue;
        };

        let meta = Meta::new(wf_id, NodeType::Workflow, &wf.playbook.title, &wf.playbook.description);
        link_workflow(graph, warns, &mut workflows, comp_node, meta)?;
    }

    for (wf_id, wf) in &state.workflows_by_id {
        if workflows.contains_key(wf_id) {
            continue;
        }
        warns.add(Warning::OrphanWorkflow {
            workflow_id: wf_id.clone(),
            title: wf.playbook.title.clone(),
            solution_id: wf.meta.solution_id.clone(),
        });
    }

    Ok(workflows)
}

fn link_workflow(
    graph: &mut Graph,
    warns: &mut Warnings,
    workflows: &mut BTreeMap<String, NodeId>,
    container: NodeId,
    meta: Meta,
) -> Result<(), GraphError> {
    let wf_node = match workflows.get(&meta.id) {
        Some(&existing) => {
            let container_meta = &graph.node(container).meta;
            warns.add(Warning::SharedWorkflow {
                workflow_id: meta.id.clone(),
                container_kind: container_meta.kind,
                container_id: container_meta.id.clone(),
            });
            existing
        }
        None => {
            let wf_id = meta.id.clone();
            let node = graph.add_node(meta);
            workflows.insert(wf_id, node);
            node
        }
    };

    graph.add_edge(container, wf_node, EdgeType::Workflow)?;
    Ok(())
}
