use lanegraph::dump::builder::{LaneStateBuilder, WorkflowBuilder};
use lanegraph::dump::TaskTrigger;
use lanegraph::graph::{build_graph, EdgeType, Graph, NodeId, NodeType, Warning};
use serde_json::json;

fn node_of(graph: &Graph, kind: NodeType, id: &str) -> NodeId {
    graph
        .nodes_of_kind(kind)
        .find(|&n| graph.node(n).id() == id)
        .unwrap_or_else(|| panic!("no {} node with id {}", kind, id))
}

fn has_edge(graph: &Graph, src: NodeId, dst: NodeId, kind: EdgeType) -> bool {
    graph.out_edges(src).any(|e| e.dst == dst && e.kind == kind)
}

fn base() -> LaneStateBuilder {
    LaneStateBuilder::new()
        .application("app1", "ALR", "Alerts")
        .playbook("pb1", "Triage", &["wf1", "wf2"])
        .component("c1", "Enrich", "wf3")
        .workflow(WorkflowBuilder::new("wf1").build())
        .workflow(WorkflowBuilder::new("wf2").build())
        .workflow(WorkflowBuilder::new("wf3").build())
}

#[test]
fn test_buttons_and_record_events() {
    let state = base()
        .button("btn1", "Escalate", "app1", "wf1")
        .record_event(
            "ev1",
            "app1",
            "wf2",
            TaskTrigger {
                on_record_create: true,
                on_record_update: true,
                ..Default::default()
            },
        )
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);

    let app = node_of(&graph, NodeType::Application, "app1");
    let wf1 = node_of(&graph, NodeType::Workflow, "wf1");
    let wf2 = node_of(&graph, NodeType::Workflow, "wf2");
    let btn = node_of(&graph, NodeType::PlaybookButton, "btn1");
    let ev = node_of(&graph, NodeType::RecordEvent, "ev1");

    assert_eq!(graph.node(btn).label(), "Escalate");
    assert!(has_edge(&graph, app, btn, EdgeType::HasAction));
    assert!(has_edge(&graph, btn, wf1, EdgeType::TriggersWorkflow));

    assert_eq!(graph.node(ev).label(), "on_create, on_update");
    assert!(has_edge(&graph, app, ev, EdgeType::HasEvent));
    assert!(has_edge(&graph, ev, wf2, EdgeType::TriggersWorkflow));

    assert_eq!(graph.resources.triggers_by_id.get("btn1"), Some(&btn));
    assert_eq!(graph.resources.triggers_by_id.get("ev1"), Some(&ev));
}

#[test]
fn test_sensors_and_schedules() {
    let state = base()
        .sensor("s1", "hook1", "webhook")
        .sensor("s2", "flow1", "flow")
        .sensor("s3", "mailbox", "email")
        .workflow(
            WorkflowBuilder::new("wf1")
                .trigger("schedules", json!([{ "cron": "*/5 * * * *" }]))
                .trigger("sensors", json!([{ "hook1": {} }]))
                .build(),
        )
        .workflow(WorkflowBuilder::new("wf2").trigger("flows", json!([{ "flow1": {} }])).build())
        .workflow(WorkflowBuilder::new("wf3").trigger("sensors", json!([{ "ghost": {} }])).build())
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let wf1 = node_of(&graph, NodeType::Workflow, "wf1");
    let wf2 = node_of(&graph, NodeType::Workflow, "wf2");
    let hook = node_of(&graph, NodeType::Webhook, "hook1");
    let flow = node_of(&graph, NodeType::FlowEvent, "flow1");
    let cron = node_of(&graph, NodeType::CronEvent, "wf1_cron");

    assert_eq!(graph.node(cron).label(), "Scheduled (*/5 * * * *)");
    assert!(has_edge(&graph, cron, wf1, EdgeType::TriggersWorkflow));
    assert!(has_edge(&graph, hook, wf1, EdgeType::TriggersWorkflow));
    assert!(has_edge(&graph, flow, wf2, EdgeType::TriggersWorkflow));
    assert_eq!(graph.resources.triggers_by_id.get("wf1_cron"), Some(&cron));

    assert!(!graph.resources.triggers_by_id.contains_key("mailbox"));
    assert_eq!(
        warnings,
        vec![
            Warning::UnknownSensorType {
                sensor: "mailbox".to_string(),
                kind: "email".to_string(),
            },
            Warning::UnknownSensorTrigger {
                sensor: "ghost".to_string(),
                workflow_id: "wf3".to_string(),
            },
        ]
    );
}

#[test]
fn test_malformed_trigger_configuration() {
    let state = base()
        .workflow(
            WorkflowBuilder::new("wf1")
                .trigger("schedules", json!({ "cron": "0 * * * *" }))
                .trigger("sensors", json!([]))
                .build(),
        )
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    assert_eq!(graph.nodes_of_kind(NodeType::CronEvent).count(), 0);
    let kinds: Vec<&str> = warnings
        .iter()
        .filter_map(|w| match w {
            Warning::MalformedTrigger { workflow_id, trigger_kind, .. } if workflow_id == "wf1" => Some(trigger_kind.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec!["schedules", "sensors"]);
}

#[test]
fn test_tasks_with_broken_references_are_skipped() {
    let state = base()
        .button("btn-no-app", "Lost", "app-missing", "wf1")
        .button("btn-no-wf", "Lost", "app1", "wf-missing")
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    assert_eq!(graph.nodes_of_kind(NodeType::PlaybookButton).count(), 0);
    assert_eq!(
        warnings,
        vec![
            Warning::TaskUnknownApplication {
                task_id: "btn-no-app".to_string(),
                application_id: "app-missing".to_string(),
            },
            Warning::TaskUnknownWorkflow {
                task_id: "btn-no-wf".to_string(),
                workflow_id: "wf-missing".to_string(),
            },
        ]
    );
}

#[test]
fn test_task_triggering_a_component_workflow() {
    let state = base().button("btn1", "Enrich now", "app1", "wf3").build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let btn = node_of(&graph, NodeType::PlaybookButton, "btn1");
    let wf3 = node_of(&graph, NodeType::Workflow, "wf3");
    assert!(has_edge(&graph, btn, wf3, EdgeType::TriggersWorkflow));
    assert_eq!(
        warnings,
        vec![Warning::TaskTriggersComponent {
            task_id: "btn1".to_string(),
            workflow_id: "wf3".to_string(),
            component_id: "c1".to_string(),
        }]
    );
}

#[test]
fn test_colliding_trigger_ids_keep_the_first() {
    let state = base()
        .sensor("s1", "t1", "webhook")
        .button("t1", "Clash", "app1", "wf1")
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let hook = node_of(&graph, NodeType::Webhook, "t1");
    assert_eq!(graph.resources.triggers_by_id.get("t1"), Some(&hook));
    assert_eq!(
        warnings,
        vec![Warning::DuplicateTrigger {
            trigger_id: "t1".to_string(),
            kind: NodeType::PlaybookButton,
        }]
    );
}
