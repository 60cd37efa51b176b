use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;
use crate::dump::{LaneState, OrchestrationTask, Workflow};
use crate::error::GraphError;
use crate::graph::reflect;
use crate::graph::{EdgeType, Graph, Meta, NodeId, NodeType, Warning, Warnings};

/// Suffix of the synthetic cron trigger id (`<workflowId>_cron`).
pub const CRON_ID_SUFFIX: &str = "_cron";

/// Builds every trigger node and wires it to its workflow and application.
/// Returns the trigger lookup table; only linked workflows (`workflows`) are
/// considered as targets.
pub fn link_triggers(
    graph: &mut Graph,
    warns: &mut Warnings,
    state: &LaneState,
    workflows: &BTreeMap<String, NodeId>,
) -> Result<BTreeMap<String, NodeId>, GraphError> {
    let mut triggers = BTreeMap::new();

    create_sensor_nodes(graph, warns, state, &mut triggers);
    debug!(count = triggers.len(), "sensor triggers created");

    for task in &state.orchestration_tasks {
        link_task(graph, warns, state, workflows, &mut triggers, task)?;
    }

    for (wf_id, wf) in &state.workflows_by_id {
        let Some(&wf_node) = workflows.get(wf_id) else {
            // Orphans were reported while linking workflows.
            continue;
        };
        link_workflow_triggers(graph, warns, &mut triggers, wf_id, wf, wf_node)?;
    }

    Ok(triggers)
}

fn register(
    triggers: &mut BTreeMap<String, NodeId>,
    warns: &mut Warnings,
    trigger_id: &str,
    node: NodeId,
    kind: NodeType,
) {
    match triggers.entry(trigger_id.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(_) => warns.add(Warning::DuplicateTrigger {
            trigger_id: trigger_id.to_string(),
            kind,
        }),
    }
}

fn create_sensor_nodes(
    graph: &mut Graph,
    warns: &mut Warnings,
    state: &LaneState,
    triggers: &mut BTreeMap<String, NodeId>,
) {
    for sensor in state.sensors_by_id.values() {
        let kind = match sensor.sensor.kind.as_str() {
            "webhook" => NodeType::Webhook,
            "flow" => NodeType::FlowEvent,
            other => {
                warns.add(Warning::UnknownSensorType {
                    sensor: sensor.meta.name.clone(),
                    kind: other.to_string(),
                });
                continue;
            }
        };

        let node = graph.add_node(Meta::new(&sensor.meta.name, kind, &sensor.meta.title, ""));
        register(triggers, warns, &sensor.meta.name, node, kind);
    }
}

/// Comma-joined record trigger flags of a task, each listed once in
/// first-seen order.
pub fn record_event_label(task: &OrchestrationTask) -> String {
    let mut flags: Vec<&str> = Vec::new();
    for trigger in &task.triggers {
        let set = [
            (trigger.on_record_create, "on_create"),
            (trigger.on_record_update, "on_update"),
            (trigger.on_correlation_action_complete, "on_correlated"),
        ];
        for (enabled, flag) in set {
            if enabled && !flags.contains(&flag) {
                flags.push(flag);
            }
        }
    }
    flags.join(", ")
}

fn link_task(
    graph: &mut Graph,
    warns: &mut Warnings,
    state: &LaneState,
    workflows: &BTreeMap<String, NodeId>,
    triggers: &mut BTreeMap<String, NodeId>,
    task: &OrchestrationTask,
) -> Result<(), GraphError> {
    let Some(&app_node) = graph.resources.apps_by_id.get(&task.application_id) else {
        warns.add(Warning::TaskUnknownApplication {
            task_id: task.id.clone(),
            application_id: task.application_id.clone(),
        });
        return Ok(());
    };

    let Some(&wf_node) = workflows.get(&task.playbook_id) else {
        warns.add(Warning::TaskUnknownWorkflow {
            task_id: task.id.clone(),
            workflow_id: task.playbook_id.clone(),
        });
        return Ok(());
    };

    if let Some(component) = state.components_by_id.values().find(|c| c.playbook_id == task.playbook_id) {
        warns.add(Warning::TaskTriggersComponent {
            task_id: task.id.clone(),
            workflow_id: task.playbook_id.clone(),
            component_id: component.id.clone(),
        });
    }

    let (kind, label, app_edge) = if task.triggers.is_empty() {
        (NodeType::PlaybookButton, task.name.clone(), EdgeType::HasAction)
    } else {
        (NodeType::RecordEvent, record_event_label(task), EdgeType::HasEvent)
    };

    let node = graph.add_node(Meta::new(&task.id, kind, label, ""));
    register(triggers, warns, &task.id, node, kind);
    graph.add_edge(app_node, node, app_edge)?;
    graph.add_edge(node, wf_node, EdgeType::TriggersWorkflow)?;
    Ok(())
}

fn link_workflow_triggers(
    graph: &mut Graph,
    warns: &mut Warnings,
    triggers: &mut BTreeMap<String, NodeId>,
    wf_id: &str,
    wf: &Workflow,
    wf_node: NodeId,
) -> Result<(), GraphError> {
    for (trigger_kind, conf) in &wf.playbook.triggers {
        match trigger_kind.as_str() {
            "schedules" => {
                let schedule = match reflect::cron_schedule(conf) {
                    Ok(schedule) => schedule,
                    Err(source) => {
                        warns.add(Warning::MalformedTrigger {
                            workflow_id: wf_id.to_string(),
                            trigger_kind: trigger_kind.clone(),
                            source,
                        });
                        continue;
                    }
                };

                let cron_id = format!("{}{}", wf_id, CRON_ID_SUFFIX);
                let label = format!("Scheduled ({})", schedule);
                let node = graph.add_node(Meta::new(&cron_id, NodeType::CronEvent, label, ""));
                graph.add_edge(node, wf_node, EdgeType::TriggersWorkflow)?;
                register(triggers, warns, &cron_id, node, NodeType::CronEvent);
            }
            "sensors" | "flows" => {
                let sensor = match reflect::sensor_trigger(conf) {
                    Ok(sensor) => sensor,
                    Err(source) => {
                        warns.add(Warning::MalformedTrigger {
                            workflow_id: wf_id.to_string(),
                            trigger_kind: trigger_kind.clone(),
                            source,
                        });
                        continue;
                    }
                };

                let sensor_node = triggers
                    .get(&sensor)
                    .copied()
                    .filter(|&n| matches!(graph.node(n).kind(), NodeType::Webhook | NodeType::FlowEvent));

                match sensor_node {
                    Some(sensor_node) => {
                        graph.add_edge(sensor_node, wf_node, EdgeType::TriggersWorkflow)?;
                    }
                    None => warns.add(Warning::UnknownSensorTrigger {
                        sensor,
                        workflow_id: wf_id.to_string(),
                    }),
                }
            }
            _ => {}
        }
    }
    Ok(())
}
