pub mod builder;
pub mod loader;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Point-in-time snapshot of one tenant's orchestration configuration.
///
/// This is the persisted dump format; top-level keys are PascalCase while the
/// nested resources keep the platform's own camelCase keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LaneState {
    #[serde(default, deserialize_with = "nullable")]
    pub time_stamp: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tenant: Tenant,
    /// Playbooks reference one or more workflows.
    #[serde(default, deserialize_with = "nullable")]
    pub playbooks_by_id: BTreeMap<String, OrchestrationSolution>,
    /// Components reference exactly one workflow.
    #[serde(default, deserialize_with = "nullable")]
    pub components_by_id: BTreeMap<String, OrchestrationSolution>,
    #[serde(default, deserialize_with = "nullable")]
    pub workflows_by_id: BTreeMap<String, Workflow>,
    #[serde(default, deserialize_with = "nullable")]
    pub applications_by_id: BTreeMap<String, Application>,
    #[serde(default, deserialize_with = "nullable")]
    pub connectors_by_id: BTreeMap<String, Connector>,
    #[serde(default, deserialize_with = "nullable")]
    pub sensors_by_id: BTreeMap<String, Sensor>,
    /// Bindings between applications and workflows (buttons, record events).
    #[serde(default, deserialize_with = "nullable")]
    pub orchestration_tasks: Vec<OrchestrationTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_count: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub created_date_time: String,
}

/// A playbook or a component.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSolution {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    /// Workflows of a playbook.
    #[serde(default, deserialize_with = "nullable")]
    pub playbook_ids: Vec<String>,
    /// Workflow of a component.
    #[serde(default, deserialize_with = "nullable")]
    pub playbook_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub meta: WorkflowMeta,
    #[serde(default, deserialize_with = "nullable")]
    pub playbook: Playbook,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMeta {
    #[serde(default, deserialize_with = "nullable")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub solution_id: String,
}

/// The action chain of a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub entrypoints: Vec<String>,
    /// Schema-less trigger configuration keyed by trigger kind
    /// (`schedules`, `sensors`, `flows`).
    #[serde(default, deserialize_with = "nullable")]
    pub triggers: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub actions: BTreeMap<String, PlaybookAction>,
}

/// A single step in an action chain. Which fields are meaningful depends on `kind`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookAction {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// Untyped key-value bag; its shape depends on the action type.
    #[serde(default)]
    pub inputs: Value,
    #[serde(rename = "on-success", default, deserialize_with = "nullable")]
    pub on_success: Vec<Map<String, Value>>,
    #[serde(rename = "on-failure", default, deserialize_with = "nullable")]
    pub on_failure: Vec<Map<String, Value>>,
    #[serde(rename = "on-complete", default, deserialize_with = "nullable")]
    pub on_complete: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "nullable")]
    pub conditions: Vec<ActionCondition>,
    #[serde(rename = "else", default, deserialize_with = "nullable")]
    pub else_action: String,
    /// Action reference, e.g. `connector_name.action` or
    /// `$playbook.component_<id>_playbook`.
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, deserialize_with = "nullable")]
    pub entrypoints: Vec<String>,
    /// Nested chain of loop bodies and parallel groups.
    #[serde(default, deserialize_with = "nullable")]
    pub actions: BTreeMap<String, PlaybookAction>,
    #[serde(rename = "loop", default, deserialize_with = "nullable")]
    pub loop_config: ActionLoop,
    #[serde(default, deserialize_with = "nullable")]
    pub record_action_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionCondition {
    /// Target action taken when the condition holds.
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default)]
    pub condition: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionLoop {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
}

/// Record type schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub acronym: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub fields: Vec<ApplicationField>,
}

impl Application {
    pub fn field_by_key(&self, key: &str) -> Option<&ApplicationField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationField {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub field_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Connector {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub meta: ConnectorMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorMeta {
    #[serde(default, deserialize_with = "nullable")]
    pub manifest: ConnectorManifest,
}

/// Connectors are referenced from actions by `name`, not by resource id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorManifest {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub product: String,
}

/// Webhook or flow event listener.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sensor {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub meta: SensorMeta,
    #[serde(rename = "Sensor", default, deserialize_with = "nullable")]
    pub sensor: SensorSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorMeta {
    #[serde(default, deserialize_with = "nullable")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorSpec {
    #[serde(rename = "type", alias = "Type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(alias = "Name", default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "Title", default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(alias = "Description", default, deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationTask {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub application_id: String,
    /// Workflow id (not a playbook solution id, despite the name).
    #[serde(default, deserialize_with = "nullable")]
    pub playbook_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub triggers: Vec<TaskTrigger>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskTrigger {
    #[serde(default, deserialize_with = "nullable")]
    pub on_record_create: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub on_record_update: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub on_correlation_action_complete: bool,
}

// Absent collections are serialized as `null` by the producer.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
