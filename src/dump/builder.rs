use crate::dump::{
    ActionCondition, Application, ApplicationField, Connector, ConnectorManifest, ConnectorMeta,
    LaneState, OrchestrationSolution, OrchestrationTask, Playbook, PlaybookAction, Sensor,
    SensorMeta, SensorSpec, TaskTrigger, Workflow, WorkflowMeta,
};
use serde_json::{Map, Value};

/// Fluent construction of a [`LaneState`] without going through JSON.
pub struct LaneStateBuilder {
    state: LaneState,
}

impl LaneStateBuilder {
    pub fn new() -> Self {
        Self {
            state: LaneState::default(),
        }
    }

    pub fn tenant(mut self, id: &str, name: &str) -> Self {
        self.state.tenant.id = id.to_string();
        self.state.tenant.name = name.to_string();
        self
    }

    pub fn time_stamp(mut self, ts: &str) -> Self {
        self.state.time_stamp = ts.to_string();
        self
    }

    pub fn application(mut self, id: &str, acronym: &str, name: &str) -> Self {
        self.state.applications_by_id.insert(id.to_string(), Application {
            id: id.to_string(),
            acronym: acronym.to_string(),
            name: name.to_string(),
            fields: Vec::new(),
        });
        self
    }

    /// Adds a field to an application registered earlier; ignored otherwise.
    pub fn field(mut self, app_id: &str, key: &str, name: &str) -> Self {
        if let Some(app) = self.state.applications_by_id.get_mut(app_id) {
            app.fields.push(ApplicationField {
                id: format!("{}_{}", app_id, key),
                key: key.to_string(),
                name: name.to_string(),
                field_type: "text".to_string(),
            });
        }
        self
    }

    pub fn playbook(mut self, id: &str, name: &str, workflow_ids: &[&str]) -> Self {
        self.state.playbooks_by_id.insert(id.to_string(), OrchestrationSolution {
            id: id.to_string(),
            playbook_ids: workflow_ids.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn component(mut self, id: &str, name: &str, workflow_id: &str) -> Self {
        self.state.components_by_id.insert(id.to_string(), OrchestrationSolution {
            id: id.to_string(),
            playbook_id: workflow_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn connector(mut self, id: &str, manifest_name: &str, title: &str) -> Self {
        self.state.connectors_by_id.insert(id.to_string(), Connector {
            id: id.to_string(),
            meta: ConnectorMeta {
                manifest: ConnectorManifest {
                    name: manifest_name.to_string(),
                    title: title.to_string(),
                    product: String::new(),
                },
            },
        });
        self
    }

    /// `kind` is the sensor type as reported by the platform (`webhook`, `flow`, ...).
    pub fn sensor(mut self, id: &str, name: &str, kind: &str) -> Self {
        self.state.sensors_by_id.insert(id.to_string(), Sensor {
            id: id.to_string(),
            meta: SensorMeta {
                enabled: true,
                name: name.to_string(),
                title: name.to_string(),
            },
            sensor: SensorSpec {
                kind: kind.to_string(),
                name: name.to_string(),
                title: name.to_string(),
                description: String::new(),
            },
        });
        self
    }

    /// A task without triggers, shown as a button on the application.
    pub fn button(mut self, id: &str, name: &str, app_id: &str, workflow_id: &str) -> Self {
        self.state.orchestration_tasks.push(OrchestrationTask {
            id: id.to_string(),
            application_id: app_id.to_string(),
            playbook_id: workflow_id.to_string(),
            name: name.to_string(),
            kind: "playbookButton".to_string(),
            ..Default::default()
        });
        self
    }

    pub fn record_event(mut self, id: &str, app_id: &str, workflow_id: &str, trigger: TaskTrigger) -> Self {
        self.state.orchestration_tasks.push(OrchestrationTask {
            id: id.to_string(),
            application_id: app_id.to_string(),
            playbook_id: workflow_id.to_string(),
            name: id.to_string(),
            kind: "recordEvent".to_string(),
            triggers: vec![trigger],
            ..Default::default()
        });
        self
    }

    pub fn workflow(mut self, workflow: Workflow) -> Self {
        self.state.workflows_by_id.insert(workflow.id.clone(), workflow);
        self
    }

    pub fn build(self) -> LaneState {
        self.state
    }
}

impl Default for LaneStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            workflow: Workflow {
                id: id.to_string(),
                meta: WorkflowMeta {
                    enabled: true,
                    solution_id: String::new(),
                },
                playbook: Playbook {
                    title: id.to_string(),
                    name: format!("{}_name", id),
                    ..Default::default()
                },
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.workflow.playbook.title = title.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.workflow.playbook.name = name.to_string();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.workflow.meta.enabled = enabled;
        self
    }

    pub fn entrypoint(mut self, action_id: &str) -> Self {
        self.workflow.playbook.entrypoints.push(action_id.to_string());
        self
    }

    pub fn action(mut self, id: &str, action: PlaybookAction) -> Self {
        self.workflow.playbook.actions.insert(id.to_string(), action);
        self
    }

    pub fn trigger(mut self, kind: &str, conf: Value) -> Self {
        self.workflow.playbook.triggers.insert(kind.to_string(), conf);
        self
    }

    pub fn build(self) -> Workflow {
        self.workflow
    }
}

pub struct ActionBuilder {
    action: PlaybookAction,
}

impl ActionBuilder {
    /// `kind` is the raw action type string (`recordAction`, `http`, `loop`, ...).
    pub fn new(kind: &str) -> Self {
        Self {
            action: PlaybookAction {
                kind: kind.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.action.title = title.to_string();
        self
    }

    pub fn input(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.action.inputs.is_object() {
            self.action.inputs = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.action.inputs {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn inputs(mut self, inputs: Value) -> Self {
        self.action.inputs = inputs;
        self
    }

    pub fn record_type(mut self, record_action_type: &str) -> Self {
        self.action.record_action_type = record_action_type.to_string();
        self
    }

    pub fn action_ref(mut self, action_ref: &str) -> Self {
        self.action.action = action_ref.to_string();
        self
    }

    pub fn loop_kind(mut self, kind: &str) -> Self {
        self.action.loop_config.kind = kind.to_string();
        self
    }

    pub fn on_success(mut self, next: &str) -> Self {
        self.action.on_success.push(continuation(next));
        self
    }

    pub fn on_failure(mut self, next: &str) -> Self {
        self.action.on_failure.push(continuation(next));
        self
    }

    pub fn on_complete(mut self, next: &str) -> Self {
        self.action.on_complete.push(continuation(next));
        self
    }

    pub fn condition(mut self, target: &str) -> Self {
        self.action.conditions.push(ActionCondition {
            action: target.to_string(),
            condition: Value::Null,
        });
        self
    }

    pub fn otherwise(mut self, target: &str) -> Self {
        self.action.else_action = target.to_string();
        self
    }

    /// Adds an action to the nested chain (loop body or parallel group).
    pub fn inner(mut self, id: &str, action: PlaybookAction) -> Self {
        self.action.actions.insert(id.to_string(), action);
        self
    }

    pub fn inner_entrypoint(mut self, id: &str) -> Self {
        self.action.entrypoints.push(id.to_string());
        self
    }

    pub fn build(self) -> PlaybookAction {
        self.action
    }
}

fn continuation(next: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(next.to_string(), Value::Object(Map::new()));
    map
}
