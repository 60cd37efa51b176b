use std::collections::BTreeMap;
use crate::dump::LaneState;
use crate::graph::{Graph, Meta, NodeId, NodeType, ResourceNodes};

/// Creates one node per top-level resource and returns the lookup tables.
/// Triggers are left empty; they are only known after trigger linking.
pub fn create_nodes(graph: &mut Graph, state: &LaneState) -> ResourceNodes {
    ResourceNodes {
        apps_by_id: create_app_nodes(graph, state),
        components_by_id: create_component_nodes(graph, state),
        playbooks_by_id: create_playbook_nodes(graph, state),
        connectors_by_id: create_connector_nodes(graph, state),
        triggers_by_id: BTreeMap::new(),
    }
}

fn create_app_nodes(graph: &mut Graph, state: &LaneState) -> BTreeMap<String, NodeId> {
    state
        .applications_by_id
        .iter()
        .map(|(app_id, app)| {
            let label = format!("[{}] {}", app.acronym, app.name);
            let node = graph.add_node(Meta::new(app_id, NodeType::Application, label, ""));
            (app_id.clone(), node)
        })
        .collect()
}

fn create_component_nodes(graph: &mut Graph, state: &LaneState) -> BTreeMap<String, NodeId> {
    state
        .components_by_id
        .iter()
        .map(|(comp_id, comp)| {
            let node = graph.add_node(Meta::new(comp_id, NodeType::Component, &comp.name, &comp.description));
            (comp_id.clone(), node)
        })
        .collect()
}

fn create_playbook_nodes(graph: &mut Graph, state: &LaneState) -> BTreeMap<String, NodeId> {
    state
        .playbooks_by_id
        .iter()
        .map(|(pb_id, pb)| {
            let node = graph.add_node(Meta::new(pb_id, NodeType::Playbook, &pb.name, &pb.description));
            (pb_id.clone(), node)
        })
        .collect()
}

// Actions reference connectors by manifest name, so that is the key here.
fn create_connector_nodes(graph: &mut Graph, state: &LaneState) -> BTreeMap<String, NodeId> {
    state
        .connectors_by_id
        .values()
        .map(|conn| {
            let manifest = &conn.meta.manifest;
            let node = graph.add_node(Meta::new(
                &manifest.name,
                NodeType::Connector,
                &manifest.title,
                &manifest.product,
            ));
            (manifest.name.clone(), node)
        })
        .collect()
}
