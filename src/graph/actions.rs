//! Action-chain compiler: turns the keyed-by-id action map of a workflow (or of
//! a loop body / parallel group) into linked action nodes.

use std::collections::{BTreeMap, HashSet};
use serde_json::{Map, Value};
use crate::dump::PlaybookAction;
use crate::error::{ActionError, GraphError};
use crate::graph::reflect;
use crate::graph::{EdgeType, Graph, Meta, NodeId, NodeType, Warning, Warnings};

/// Action refs of this shape call a component: `$playbook.component_<id>_playbook`.
pub const COMPONENT_REF_PREFIX: &str = "$playbook.component_";
pub const COMPONENT_REF_SUFFIX: &str = "_playbook";

/// Raw action `type` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Transformation,
    Python,
    CreateVariables,
    UpdateVariables,
    Http,
    Conditional,
    ParallelGroup,
    Loop,
    EmitEvent,
    Connector,
    RecordAction,
    Unknown(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "transformation" => ActionKind::Transformation,
            "python" => ActionKind::Python,
            "createVariables" => ActionKind::CreateVariables,
            "updateVariables" => ActionKind::UpdateVariables,
            "http" => ActionKind::Http,
            "conditional" => ActionKind::Conditional,
            "parallelGroup" => ActionKind::ParallelGroup,
            "loop" => ActionKind::Loop,
            "emitEvent" => ActionKind::EmitEvent,
            "connector" => ActionKind::Connector,
            "recordAction" => ActionKind::RecordAction,
            other => ActionKind::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopKind {
    While,
    ForEach,
    Unknown(String),
}

impl LoopKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "while" => LoopKind::While,
            "for" => LoopKind::ForEach,
            other => LoopKind::Unknown(other.to_string()),
        }
    }
}

/// Raw `recordActionType` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordActionKind {
    Create,
    Patch,
    Search,
    Delete,
    Upsert,
    Export,
    Unknown(String),
}

impl RecordActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "create" => RecordActionKind::Create,
            "patch" => RecordActionKind::Patch,
            "search" => RecordActionKind::Search,
            "delete" => RecordActionKind::Delete,
            "upsert" => RecordActionKind::Upsert,
            "export" => RecordActionKind::Export,
            other => RecordActionKind::Unknown(other.to_string()),
        }
    }

    /// Unknown subtypes fall back to the generic record action.
    pub fn node_type(&self) -> NodeType {
        match self {
            RecordActionKind::Create => NodeType::RecordCreateAction,
            RecordActionKind::Patch => NodeType::RecordUpdateAction,
            RecordActionKind::Search => NodeType::RecordSearchAction,
            RecordActionKind::Delete => NodeType::RecordDeleteAction,
            RecordActionKind::Upsert => NodeType::RecordUpsertAction,
            RecordActionKind::Export => NodeType::RecordExportAction,
            RecordActionKind::Unknown(_) => NodeType::RecordAction,
        }
    }
}

/// Component id from a component-call action ref, if it is one.
pub fn component_ref(action_ref: &str) -> Option<&str> {
    action_ref
        .strip_prefix(COMPONENT_REF_PREFIX)
        .map(|rest| rest.strip_suffix(COMPONENT_REF_SUFFIX).unwrap_or(rest))
}

/// Connector manifest name from a direct connector action ref (`<connector>.<action>`).
pub fn connector_ref(action_ref: &str) -> &str {
    action_ref
        .split_once('.')
        .map(|(connector, _)| connector)
        .unwrap_or(action_ref)
}

/// Node type of a raw action.
pub fn classify(action: &PlaybookAction) -> Result<NodeType, ActionError> {
    match ActionKind::parse(&action.kind) {
        ActionKind::Transformation => Ok(NodeType::TransformationAction),
        ActionKind::Python => Ok(NodeType::PythonAction),
        ActionKind::CreateVariables => Ok(NodeType::CreateVarsAction),
        ActionKind::UpdateVariables => Ok(NodeType::UpdateVarsAction),
        ActionKind::Http => Ok(NodeType::HttpAction),
        ActionKind::Conditional => Ok(NodeType::ConditionAction),
        ActionKind::ParallelGroup => Ok(NodeType::ParallelAction),
        ActionKind::EmitEvent => Ok(NodeType::EmitEventAction),
        ActionKind::Loop => match LoopKind::parse(&action.loop_config.kind) {
            LoopKind::While => Ok(NodeType::WhileLoopAction),
            LoopKind::ForEach => Ok(NodeType::ForEachLoopAction),
            LoopKind::Unknown(kind) => Err(ActionError::UnknownLoopType(kind)),
        },
        ActionKind::Connector => {
            if component_ref(&action.action).is_some() {
                Ok(NodeType::ComponentAction)
            } else {
                Ok(NodeType::ConnectorAction)
            }
        }
        ActionKind::RecordAction => Ok(RecordActionKind::parse(&action.record_action_type).node_type()),
        ActionKind::Unknown(kind) => Err(ActionError::UnknownActionType(kind)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Follow {
    /// Record the edge and walk into the target.
    Descend,
    /// Record the edge only.
    AuditOnly,
}

/// One action map being chained, with the nodes created for it.
struct Chain<'a> {
    actions: &'a BTreeMap<String, PlaybookAction>,
    nodes: BTreeMap<&'a str, NodeId>,
}

pub struct ActionChainer<'g> {
    graph: &'g mut Graph,
    warns: &'g mut Warnings,
}

impl<'g> ActionChainer<'g> {
    pub fn new(graph: &'g mut Graph, warns: &'g mut Warnings) -> Self {
        Self { graph, warns }
    }

    /// Chains `actions` below `container` starting from `entrypoints`.
    ///
    /// Entry actions hang off the container through `entrypoint` edges; actions
    /// never reached from them get an `unreachable` edge from the container.
    pub fn chain_actions<'a>(
        &mut self,
        container: NodeId,
        actions: &'a BTreeMap<String, PlaybookAction>,
        entrypoints: &'a [String],
    ) -> Result<(), GraphError> {
        let chain = Chain {
            actions,
            nodes: self.create_action_nodes(actions)?,
        };

        let mut visited: HashSet<&'a str> = HashSet::new();

        for entrypoint in entrypoints {
            let Some(&entry) = chain.nodes.get(entrypoint.as_str()) else {
                self.warns.add(Warning::MissingEntrypoint {
                    entrypoint: entrypoint.clone(),
                    container_id: self.graph.node(container).id().to_string(),
                });
                continue;
            };

            self.graph.add_edge(container, entry, EdgeType::Entrypoint)?;
            if !visited.contains(entrypoint.as_str()) {
                self.link_action(&chain, &mut visited, entrypoint.as_str())?;
            }
        }

        for (&action_id, &node) in &chain.nodes {
            if visited.contains(action_id) {
                continue;
            }
            let container_meta = &self.graph.node(container).meta;
            self.warns.add(Warning::UnreachableAction {
                action_id: action_id.to_string(),
                container_kind: container_meta.kind,
                container_id: container_meta.id.clone(),
                container_label: container_meta.label.clone(),
            });
            self.graph.add_edge(container, node, EdgeType::Unreachable)?;
        }

        Ok(())
    }

    fn create_action_nodes<'a>(
        &mut self,
        actions: &'a BTreeMap<String, PlaybookAction>,
    ) -> Result<BTreeMap<&'a str, NodeId>, GraphError> {
        let mut nodes = BTreeMap::new();
        for (action_id, action) in actions {
            if let Some(node) = self.create_action_node(action_id, action)? {
                nodes.insert(action_id.as_str(), node);
            }
        }
        Ok(nodes)
    }

    /// Creates the node for one action and links it to the resources it
    /// references outside the workflow. `None` when the action cannot be typed.
    fn create_action_node(&mut self, action_id: &str, action: &PlaybookAction) -> Result<Option<NodeId>, GraphError> {
        let kind = match classify(action) {
            Ok(kind) => kind,
            Err(source) => {
                self.warns.add(Warning::ActionCreation {
                    action_id: action_id.to_string(),
                    source,
                });
                return Ok(None);
            }
        };

        let node = self.graph.add_node(Meta::new(action_id, kind, &action.title, &action.description));

        match kind {
            NodeType::EmitEventAction => self.link_emitting_sensor(action_id, node, action)?,
            NodeType::ComponentAction => self.link_called_component(action_id, node, action)?,
            NodeType::ConnectorAction => self.link_called_connector(action_id, node, action)?,
            NodeType::RecordAction
            | NodeType::RecordCreateAction
            | NodeType::RecordUpdateAction
            | NodeType::RecordSearchAction
            | NodeType::RecordDeleteAction
            | NodeType::RecordUpsertAction
            | NodeType::RecordExportAction => {
                if let RecordActionKind::Unknown(raw) = RecordActionKind::parse(&action.record_action_type) {
                    self.warns.add(Warning::UnknownRecordActionType {
                        action_id: action_id.to_string(),
                        kind: raw,
                    });
                }
                self.link_accessed_application(action_id, node, action)?;
            }
            _ => {}
        }

        Ok(Some(node))
    }

    fn link_emitting_sensor(&mut self, action_id: &str, node: NodeId, action: &PlaybookAction) -> Result<(), GraphError> {
        let sensor = match reflect::emit_sensor_name(&action.inputs) {
            Ok(sensor) => sensor,
            Err(source) => {
                self.warns.add(Warning::EmitReference {
                    action_id: action_id.to_string(),
                    source,
                });
                return Ok(());
            }
        };

        let sensor_node = self
            .graph
            .resources
            .triggers_by_id
            .get(&sensor)
            .copied()
            .filter(|&n| matches!(self.graph.node(n).kind(), NodeType::Webhook | NodeType::FlowEvent));

        match sensor_node {
            Some(sensor_node) => {
                self.graph.add_edge(sensor_node, node, EdgeType::EmittedBy)?;
            }
            None => self.warns.add(Warning::UnknownEmitSensor {
                action_id: action_id.to_string(),
                sensor,
            }),
        }
        Ok(())
    }

    fn link_called_component(&mut self, action_id: &str, node: NodeId, action: &PlaybookAction) -> Result<(), GraphError> {
        let component_id = component_ref(&action.action).unwrap_or_default();
        match self.graph.resources.components_by_id.get(component_id).copied() {
            Some(component) => {
                self.graph.add_edge(component, node, EdgeType::CalledBy)?;
            }
            None => self.warns.add(Warning::UnknownComponent {
                action_id: action_id.to_string(),
                component_id: component_id.to_string(),
            }),
        }
        Ok(())
    }

    fn link_called_connector(&mut self, action_id: &str, node: NodeId, action: &PlaybookAction) -> Result<(), GraphError> {
        let connector = connector_ref(&action.action);
        if connector.is_empty() {
            self.warns.add(Warning::MissingConnectorRef {
                action_id: action_id.to_string(),
            });
            return Ok(());
        }

        match self.graph.resources.connectors_by_id.get(connector).copied() {
            Some(connector_node) => {
                self.graph.add_edge(connector_node, node, EdgeType::CalledBy)?;
            }
            None => self.warns.add(Warning::UnknownConnector {
                action_id: action_id.to_string(),
                connector: connector.to_string(),
            }),
        }
        Ok(())
    }

    fn link_accessed_application(&mut self, action_id: &str, node: NodeId, action: &PlaybookAction) -> Result<(), GraphError> {
        let app_id = match reflect::record_application_id(&action.inputs) {
            Ok(app_id) => app_id,
            Err(source) => {
                self.warns.add(Warning::RecordReference {
                    action_id: action_id.to_string(),
                    source,
                });
                return Ok(());
            }
        };

        match self.graph.resources.apps_by_id.get(&app_id).copied() {
            Some(app) => {
                self.graph.add_edge(app, node, EdgeType::AccessedBy)?;
            }
            None => self.warns.add(Warning::UnknownRecordApplication {
                action_id: action_id.to_string(),
                application_id: app_id,
            }),
        }
        Ok(())
    }

    /// Links one action to its successors and walks into the unvisited ones.
    fn link_action<'a>(
        &mut self,
        chain: &Chain<'a>,
        visited: &mut HashSet<&'a str>,
        action_id: &'a str,
    ) -> Result<(), GraphError> {
        visited.insert(action_id);

        let (Some(action), Some(&node)) = (chain.actions.get(action_id), chain.nodes.get(action_id)) else {
            return Ok(());
        };

        // Loop bodies and parallel groups chain below the action itself.
        if !action.entrypoints.is_empty() {
            self.chain_actions(node, &action.actions, &action.entrypoints)?;
        }

        if self.graph.node(node).kind() == NodeType::ConditionAction {
            for (idx, condition) in action.conditions.iter().enumerate() {
                if condition.action.is_empty() {
                    continue;
                }
                let label = Some(format!("condition {}", idx + 1));
                self.link_next(chain, visited, node, action_id, EdgeType::If, label, &[condition.action.as_str()], Follow::Descend)?;
            }
            if !action.else_action.is_empty() {
                self.link_next(chain, visited, node, action_id, EdgeType::Else, None, &[action.else_action.as_str()], Follow::Descend)?;
            }

            // Continuations of a conditional often point at phantom actions; keep them for audit only.
            for (kind, maps) in continuations(action) {
                let next_ids = next_action_ids(maps);
                self.link_next(chain, visited, node, action_id, kind, None, &next_ids, Follow::AuditOnly)?;
            }
            return Ok(());
        }

        for (kind, maps) in continuations(action) {
            let next_ids = next_action_ids(maps);
            self.link_next(chain, visited, node, action_id, kind, None, &next_ids, Follow::Descend)?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn link_next<'a>(
        &mut self,
        chain: &Chain<'a>,
        visited: &mut HashSet<&'a str>,
        source: NodeId,
        source_id: &str,
        kind: EdgeType,
        label: Option<String>,
        next_ids: &[&'a str],
        follow: Follow,
    ) -> Result<(), GraphError> {
        for &next_id in next_ids {
            let Some(&next) = chain.nodes.get(next_id) else {
                if follow == Follow::Descend {
                    self.warns.add(Warning::MissingNextAction {
                        next_id: next_id.to_string(),
                        action_id: source_id.to_string(),
                    });
                }
                continue;
            };

            self.graph.add_labeled_edge(source, next, kind, label.clone())?;

            if follow == Follow::Descend && !visited.contains(next_id) {
                self.link_action(chain, visited, next_id)?;
            }
        }
        Ok(())
    }
}

fn continuations(action: &PlaybookAction) -> [(EdgeType, &[Map<String, Value>]); 3] {
    [
        (EdgeType::OnSuccess, action.on_success.as_slice()),
        (EdgeType::OnFailure, action.on_failure.as_slice()),
        (EdgeType::OnComplete, action.on_complete.as_slice()),
    ]
}

/// Keys of the continuation maps are the next action ids; values are ignored.
fn next_action_ids(maps: &[Map<String, Value>]) -> Vec<&str> {
    let mut ids: Vec<&str> = maps.iter().flat_map(|m| m.keys().map(String::as_str)).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::builder::ActionBuilder;

    #[test]
    fn test_component_ref() {
        assert_eq!(component_ref("$playbook.component_42_playbook"), Some("42"));
        assert_eq!(component_ref("$playbook.component_42"), Some("42"));
        assert_eq!(component_ref("sentinel.run_query"), None);
    }

    #[test]
    fn test_connector_ref() {
        assert_eq!(connector_ref("sentinel.run_query"), "sentinel");
        assert_eq!(connector_ref("sentinel"), "sentinel");
        assert_eq!(connector_ref(".run_query"), "");
    }

    #[test]
    fn test_classify_nested_dispatch() {
        let action = ActionBuilder::new("loop").loop_kind("for").build();
        assert_eq!(classify(&action), Ok(NodeType::ForEachLoopAction));

        let action = ActionBuilder::new("loop").loop_kind("until").build();
        assert_eq!(classify(&action), Err(ActionError::UnknownLoopType("until".to_string())));

        let action = ActionBuilder::new("recordAction").record_type("patch").build();
        assert_eq!(classify(&action), Ok(NodeType::RecordUpdateAction));

        let action = ActionBuilder::new("recordAction").record_type("merge").build();
        assert_eq!(classify(&action), Ok(NodeType::RecordAction));

        let action = ActionBuilder::new("connector").action_ref("$playbook.component_7_playbook").build();
        assert_eq!(classify(&action), Ok(NodeType::ComponentAction));

        let action = ActionBuilder::new("sendEmail").build();
        assert_eq!(classify(&action), Err(ActionError::UnknownActionType("sendEmail".to_string())));
    }

    #[test]
    fn test_next_action_ids_sorted_and_unique() {
        let action = ActionBuilder::new("http").on_success("c").on_success("a").on_success("c").build();
        assert_eq!(next_action_ids(&action.on_success), vec!["a", "c"]);
    }
}
