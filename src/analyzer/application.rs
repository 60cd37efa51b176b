use crate::analyzer::Analyzer;
use crate::dump::ApplicationField;
use crate::error::InspectionError;
use crate::graph::reflect;
use crate::graph::walk::WalkOpts;
use crate::graph::{EdgeType, NodeId, NodeType};

/// Action node types that read or write records of an application.
pub const RECORD_ACCESS_TYPES: [NodeType; 6] = [
    NodeType::RecordCreateAction,
    NodeType::RecordUpsertAction,
    NodeType::RecordUpdateAction,
    NodeType::RecordDeleteAction,
    NodeType::RecordSearchAction,
    NodeType::RecordExportAction,
];

/// A trigger on an application and the workflow it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerAction {
    pub trigger: NodeId,
    pub playbook: Option<NodeId>,
    pub workflow: Option<NodeId>,
    pub enabled: bool,
}

impl TriggerAction {
    pub fn status(&self) -> &'static str {
        if self.enabled { "enabled" } else { "disabled" }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationTriggers {
    pub buttons: Vec<TriggerAction>,
    pub record_events: Vec<TriggerAction>,
}

/// An action touching an application's records, attributed to the playbook
/// or component that owns its workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessAction {
    pub action: NodeId,
    pub workflow: NodeId,
    pub playbook: Option<NodeId>,
    pub component: Option<NodeId>,
    /// Only meaningful for playbook rows.
    pub enabled: bool,
    /// Set when field-level inspection of this action failed.
    pub inspection_error: Option<InspectionError>,
}

impl AccessAction {
    pub fn is_component_action(&self) -> bool {
        self.component.is_some()
    }
}

impl Analyzer<'_> {
    fn workflow_enabled(&self, workflow: Option<NodeId>) -> bool {
        workflow
            .and_then(|wf| self.workflow_resource(wf))
            .is_some_and(|wf| wf.meta.enabled)
    }

    /// Buttons and record events of an application, each ordered by label.
    pub fn application_triggers(&self, app: NodeId) -> ApplicationTriggers {
        let one_hop = WalkOpts::descend().max_depth(1);
        let buttons = self.graph.find_unique(app, &one_hop, &[NodeType::PlaybookButton]);
        let events = self.graph.find_unique(app, &one_hop, &[NodeType::RecordEvent]);

        ApplicationTriggers {
            buttons: self.trigger_actions(buttons),
            record_events: self.trigger_actions(events),
        }
    }

    fn trigger_actions(&self, triggers: impl IntoIterator<Item = NodeId>) -> Vec<TriggerAction> {
        self.graph
            .sort_by_label(triggers)
            .into_iter()
            .map(|trigger| {
                let workflow = self.workflow_for_trigger(trigger);
                TriggerAction {
                    trigger,
                    playbook: workflow.and_then(|wf| self.playbook_for_workflow(wf)),
                    workflow,
                    enabled: self.workflow_enabled(workflow),
                }
            })
            .collect()
    }

    /// Record actions that access `app`, one row per owning container.
    pub fn application_accessed_by(&self, app: NodeId) -> Vec<AccessAction> {
        let opts = WalkOpts::descend().follow_edge_types(&[EdgeType::AccessedBy]);
        let mut rows = Vec::new();

        for action in self.graph.find_all(app, &opts, &RECORD_ACCESS_TYPES) {
            let Some(workflow) = self.workflow_for_action(action) else {
                continue;
            };

            if let Some(component) = self.component_for_workflow(workflow) {
                rows.push(AccessAction {
                    action,
                    workflow,
                    playbook: None,
                    component: Some(component),
                    enabled: false,
                    inspection_error: None,
                });
            }

            if let Some(playbook) = self.playbook_for_workflow(workflow) {
                rows.push(AccessAction {
                    action,
                    workflow,
                    playbook: Some(playbook),
                    component: None,
                    enabled: self.workflow_enabled(Some(workflow)),
                    inspection_error: None,
                });
            }
        }

        rows
    }

    /// Accessing actions that may modify `field`. Rows that cannot be
    /// inspected are kept with their [`InspectionError`].
    pub fn application_field_modified_by(&self, app: NodeId, field: &ApplicationField) -> Vec<AccessAction> {
        self.application_accessed_by(app)
            .into_iter()
            .filter(|row| {
                !matches!(
                    self.graph.node(row.action).kind(),
                    NodeType::RecordSearchAction | NodeType::RecordExportAction | NodeType::RecordDeleteAction
                )
            })
            .filter_map(|mut row| match self.touches_field(&row, &field.key) {
                Ok(true) => Some(row),
                Ok(false) => None,
                Err(err) => {
                    row.inspection_error = Some(err);
                    Some(row)
                }
            })
            .collect()
    }

    fn touches_field(&self, row: &AccessAction, field_key: &str) -> Result<bool, InspectionError> {
        let action = self
            .action_resource(row.workflow, row.action)
            .ok_or(InspectionError::ActionNotFound)?;
        let inputs = action.inputs.as_object().ok_or(InspectionError::MalformedInputs)?;
        Ok(reflect::touches_field(inputs, field_key)?)
    }
}
