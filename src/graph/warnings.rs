use thiserror::Error;
use tracing::debug;
use crate::error::{ActionError, ReflectError};
use crate::graph::NodeType;

/// Recoverable problems found while building the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("{container_kind} {container_id} references unknown workflow {workflow_id}")]
    UnknownWorkflow {
        container_kind: NodeType,
        container_id: String,
        workflow_id: String,
    },

    #[error("workflow {workflow_id} is referenced by more than one container (also by {container_kind} {container_id})")]
    SharedWorkflow {
        workflow_id: String,
        container_kind: NodeType,
        container_id: String,
    },

    #[error("orphan workflow {workflow_id} found with title {title} (solution: {solution_id})")]
    OrphanWorkflow {
        workflow_id: String,
        title: String,
        solution_id: String,
    },

    #[error("unknown sensor type {kind} for sensor {sensor}")]
    UnknownSensorType { sensor: String, kind: String },

    #[error("trigger id {trigger_id} is already taken, keeping the first {kind} node")]
    DuplicateTrigger { trigger_id: String, kind: NodeType },

    #[error("orchestration task {task_id} references unknown application {application_id}")]
    TaskUnknownApplication { task_id: String, application_id: String },

    #[error("orchestration task {task_id} references unknown workflow {workflow_id}")]
    TaskUnknownWorkflow { task_id: String, workflow_id: String },

    #[error("orchestration task {task_id} triggers workflow {workflow_id} of component {component_id}")]
    TaskTriggersComponent {
        task_id: String,
        workflow_id: String,
        component_id: String,
    },

    #[error("failed to reflect {trigger_kind} trigger for workflow {workflow_id}: {source}")]
    MalformedTrigger {
        workflow_id: String,
        trigger_kind: String,
        #[source]
        source: ReflectError,
    },

    #[error("sensor trigger {sensor} not found for workflow {workflow_id}")]
    UnknownSensorTrigger { sensor: String, workflow_id: String },

    #[error("failed to create action node for {action_id}: {source}")]
    ActionCreation {
        action_id: String,
        #[source]
        source: ActionError,
    },

    #[error("emitEvent action {action_id} sensor reference error: {source}")]
    EmitReference {
        action_id: String,
        #[source]
        source: ReflectError,
    },

    #[error("emitEvent action {action_id} references unknown sensor {sensor}")]
    UnknownEmitSensor { action_id: String, sensor: String },

    #[error("connector action {action_id} references unknown component {component_id}")]
    UnknownComponent { action_id: String, component_id: String },

    #[error("connector action {action_id} has no connector reference")]
    MissingConnectorRef { action_id: String },

    #[error("connector action {action_id} references unknown connector {connector}")]
    UnknownConnector { action_id: String, connector: String },

    #[error("recordAction {action_id} has unknown recordActionType {kind}")]
    UnknownRecordActionType { action_id: String, kind: String },

    #[error("recordAction {action_id} reference error: {source}")]
    RecordReference {
        action_id: String,
        #[source]
        source: ReflectError,
    },

    #[error("recordAction {action_id} references unknown application {application_id}")]
    UnknownRecordApplication { action_id: String, application_id: String },

    #[error("entry point {entrypoint} not found in action nodes for {container_id}")]
    MissingEntrypoint { entrypoint: String, container_id: String },

    #[error("next action {next_id} not found in action nodes for {action_id}")]
    MissingNextAction { next_id: String, action_id: String },

    #[error("unreachable action {action_id} in {container_kind}: {container_id} ({container_label})")]
    UnreachableAction {
        action_id: String,
        container_kind: NodeType,
        container_id: String,
        container_label: String,
    },
}

/// Ordered accumulator of [`Warning`]s threaded through graph construction.
#[derive(Debug, Default)]
pub struct Warnings {
    warns: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, warning: Warning) {
        debug!(%warning, "graph warning");
        self.warns.push(warning);
    }

    pub fn len(&self) -> usize {
        self.warns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warns.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warns
    }
}
