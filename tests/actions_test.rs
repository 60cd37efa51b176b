use lanegraph::dump::builder::{ActionBuilder, LaneStateBuilder, WorkflowBuilder};
use lanegraph::dump::{LaneState, Workflow};
use lanegraph::error::{ActionError, ReflectError};
use lanegraph::graph::{build_graph, EdgeType, Graph, NodeId, NodeType, Warning};
use serde_json::json;

fn node_of(graph: &Graph, kind: NodeType, id: &str) -> NodeId {
    graph
        .nodes_of_kind(kind)
        .find(|&n| graph.node(n).id() == id)
        .unwrap_or_else(|| panic!("no {} node with id {}", kind, id))
}

fn action_node(graph: &Graph, id: &str) -> Option<NodeId> {
    graph
        .nodes()
        .find(|(_, n)| n.kind().is_action() && n.id() == id)
        .map(|(n, _)| n)
}

fn edges_between(graph: &Graph, src: NodeId, dst: NodeId, kind: EdgeType) -> usize {
    graph.out_edges(src).filter(|e| e.dst == dst && e.kind == kind).count()
}

fn single_workflow(wf: Workflow) -> LaneState {
    LaneStateBuilder::new()
        .application("app1", "ALR", "Alerts")
        .connector("conn1", "sentinel", "Microsoft Sentinel")
        .sensor("s1", "hook1", "webhook")
        .playbook("pb1", "Triage", &[wf.id.as_str()])
        .workflow(wf)
        .build()
}

#[test]
fn test_unreachable_actions_hang_off_the_workflow() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("A")
            .action("A", ActionBuilder::new("transformation").on_success("B").build())
            .action("B", ActionBuilder::new("createVariables").build())
            .action("C", ActionBuilder::new("updateVariables").on_complete("D").build())
            .action("D", ActionBuilder::new("http").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let wf = node_of(&graph, NodeType::Workflow, "wf1");
    let c = node_of(&graph, NodeType::UpdateVarsAction, "C");
    let d = node_of(&graph, NodeType::HttpAction, "D");

    // Exactly the non-reached actions, once each; their own links are not walked.
    assert_eq!(graph.edges_of_kind(EdgeType::Unreachable).count(), 2);
    assert_eq!(edges_between(&graph, wf, c, EdgeType::Unreachable), 1);
    assert_eq!(edges_between(&graph, wf, d, EdgeType::Unreachable), 1);
    assert_eq!(edges_between(&graph, c, d, EdgeType::OnComplete), 0);

    let unreachable: Vec<&str> = warnings
        .iter()
        .filter_map(|w| match w {
            Warning::UnreachableAction { action_id, container_id, .. } => {
                assert_eq!(container_id, "wf1");
                Some(action_id.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(unreachable, vec!["C", "D"]);
}

#[test]
fn test_conditional_branches() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("check")
            .action(
                "check",
                ActionBuilder::new("conditional")
                    .condition("X")
                    .condition("")
                    .condition("W")
                    .otherwise("Y")
                    .on_success("Z")
                    .on_failure("phantom")
                    .build(),
            )
            .action("X", ActionBuilder::new("http").build())
            .action("W", ActionBuilder::new("http").build())
            .action("Y", ActionBuilder::new("python").build())
            .action("Z", ActionBuilder::new("python").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let check = node_of(&graph, NodeType::ConditionAction, "check");
    let x = node_of(&graph, NodeType::HttpAction, "X");
    let w = node_of(&graph, NodeType::HttpAction, "W");
    let y = node_of(&graph, NodeType::PythonAction, "Y");
    let z = node_of(&graph, NodeType::PythonAction, "Z");

    // 1. if/else edges mirror the declared non-empty targets
    let branches: Vec<(NodeId, EdgeType, Option<String>)> = graph
        .out_edges(check)
        .filter(|e| matches!(e.kind, EdgeType::If | EdgeType::Else))
        .map(|e| (e.dst, e.kind, e.label.clone()))
        .collect();
    assert_eq!(
        branches,
        vec![
            (x, EdgeType::If, Some("condition 1".to_string())),
            (w, EdgeType::If, Some("condition 3".to_string())),
            (y, EdgeType::Else, None),
        ]
    );

    // 2. Continuations exist for audit but are not followed
    assert_eq!(edges_between(&graph, check, z, EdgeType::OnSuccess), 1);
    let wf = node_of(&graph, NodeType::Workflow, "wf1");
    assert_eq!(edges_between(&graph, wf, z, EdgeType::Unreachable), 1);

    // 3. Phantom continuation targets are not reported
    assert!(!warnings.iter().any(|w| matches!(w, Warning::MissingNextAction { .. })));
}

#[test]
fn test_conditional_missing_branch_targets_warn() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("check")
            .action(
                "check",
                ActionBuilder::new("conditional")
                    .condition("ghost")
                    .condition("X")
                    .otherwise("nowhere")
                    .build(),
            )
            .action("X", ActionBuilder::new("http").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let check = node_of(&graph, NodeType::ConditionAction, "check");
    let x = node_of(&graph, NodeType::HttpAction, "X");

    // 1. Only the existing target gets a branch edge
    let branches: Vec<(NodeId, EdgeType)> = graph
        .out_edges(check)
        .filter(|e| matches!(e.kind, EdgeType::If | EdgeType::Else))
        .map(|e| (e.dst, e.kind))
        .collect();
    assert_eq!(branches, vec![(x, EdgeType::If)]);

    // 2. Both missing targets are reported against the conditional
    let missing: Vec<(&str, &str)> = warnings
        .iter()
        .filter_map(|w| match w {
            Warning::MissingNextAction { next_id, action_id } => Some((next_id.as_str(), action_id.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec![("ghost", "check"), ("nowhere", "check")]);
}

#[test]
fn test_loop_body_chains_below_the_loop_action() {
    let body = ActionBuilder::new("loop")
        .loop_kind("for")
        .inner_entrypoint("I1")
        .inner("I1", ActionBuilder::new("python").on_success("I2").build())
        .inner("I2", ActionBuilder::new("python").build())
        .inner("I3", ActionBuilder::new("python").build())
        .on_success("after")
        .build();

    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("L")
            .action("L", body)
            .action("after", ActionBuilder::new("http").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let l = node_of(&graph, NodeType::ForEachLoopAction, "L");
    let i1 = node_of(&graph, NodeType::PythonAction, "I1");
    let i2 = node_of(&graph, NodeType::PythonAction, "I2");
    let i3 = node_of(&graph, NodeType::PythonAction, "I3");
    let after = node_of(&graph, NodeType::HttpAction, "after");

    assert_eq!(edges_between(&graph, l, i1, EdgeType::Entrypoint), 1);
    assert_eq!(edges_between(&graph, i1, i2, EdgeType::OnSuccess), 1);
    assert_eq!(edges_between(&graph, l, i3, EdgeType::Unreachable), 1);
    assert_eq!(edges_between(&graph, l, after, EdgeType::OnSuccess), 1);

    assert!(warnings.contains(&Warning::UnreachableAction {
        action_id: "I3".to_string(),
        container_kind: NodeType::ForEachLoopAction,
        container_id: "L".to_string(),
        container_label: String::new(),
    }));
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_parallel_group_and_while_loop() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("P")
            .action(
                "P",
                ActionBuilder::new("parallelGroup")
                    .inner_entrypoint("left")
                    .inner_entrypoint("right")
                    .inner("left", ActionBuilder::new("http").build())
                    .inner("right", ActionBuilder::new("loop").loop_kind("while").build())
                    .build(),
            )
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);

    let p = node_of(&graph, NodeType::ParallelAction, "P");
    let entries: Vec<NodeType> = graph
        .out_edges(p)
        .filter(|e| e.kind == EdgeType::Entrypoint)
        .map(|e| graph.node(e.dst).kind())
        .collect();
    assert_eq!(entries, vec![NodeType::HttpAction, NodeType::WhileLoopAction]);
}

#[test]
fn test_same_action_ids_in_two_workflows_stay_distinct() {
    let wf = |id: &str| {
        WorkflowBuilder::new(id)
            .entrypoint("A")
            .action("A", ActionBuilder::new("http").on_success("B").build())
            .action("B", ActionBuilder::new("http").build())
            .build()
    };
    let state = LaneStateBuilder::new()
        .playbook("pb1", "Triage", &["wf1", "wf2"])
        .workflow(wf("wf1"))
        .workflow(wf("wf2"))
        .build();

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");
    assert!(warnings.is_empty());

    let a_nodes: Vec<NodeId> = graph
        .nodes_of_kind(NodeType::HttpAction)
        .filter(|&n| graph.node(n).id() == "A")
        .collect();
    assert_eq!(a_nodes.len(), 2);
    assert_ne!(a_nodes[0], a_nodes[1]);

    for &a in &a_nodes {
        assert_eq!(graph.node(a).incoming.len(), 1);
        assert_eq!(graph.node(a).outgoing.len(), 1);
    }
    let (first_wf, second_wf) = (
        graph.in_edges(a_nodes[0]).next().map(|e| e.src),
        graph.in_edges(a_nodes[1]).next().map(|e| e.src),
    );
    assert_ne!(first_wf, second_wf);
}

#[test]
fn test_shared_downstream_action_and_cycles() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("A")
            .action("A", ActionBuilder::new("http").on_success("B").on_failure("C").build())
            .action("B", ActionBuilder::new("http").on_success("C").on_success("C").build())
            .action("C", ActionBuilder::new("http").on_complete("A").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);

    let a = node_of(&graph, NodeType::HttpAction, "A");
    let b = node_of(&graph, NodeType::HttpAction, "B");
    let c = node_of(&graph, NodeType::HttpAction, "C");

    // Duplicate continuation targets collapse into one edge.
    assert_eq!(edges_between(&graph, b, c, EdgeType::OnSuccess), 1);
    // Edges into visited actions are still recorded.
    assert_eq!(edges_between(&graph, a, c, EdgeType::OnFailure), 1);
    assert_eq!(edges_between(&graph, c, a, EdgeType::OnComplete), 1);
    assert_eq!(graph.node(c).incoming.len(), 2);
}

#[test]
fn test_unknown_action_type_leaves_a_hole() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("A")
            .action("A", ActionBuilder::new("http").on_success("mail").build())
            .action("mail", ActionBuilder::new("sendEmail").build())
            .action("spin", ActionBuilder::new("loop").loop_kind("until").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    assert!(action_node(&graph, "mail").is_none());
    assert!(action_node(&graph, "spin").is_none());
    assert!(action_node(&graph, "A").is_some());

    assert!(warnings.contains(&Warning::ActionCreation {
        action_id: "mail".to_string(),
        source: ActionError::UnknownActionType("sendEmail".to_string()),
    }));
    assert!(warnings.contains(&Warning::ActionCreation {
        action_id: "spin".to_string(),
        source: ActionError::UnknownLoopType("until".to_string()),
    }));
    assert!(warnings.contains(&Warning::MissingNextAction {
        next_id: "mail".to_string(),
        action_id: "A".to_string(),
    }));
    assert_eq!(graph.edges_of_kind(EdgeType::Unreachable).count(), 0);
}

#[test]
fn test_missing_entrypoint_is_reported() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("nowhere")
            .action("A", ActionBuilder::new("http").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    assert!(warnings.contains(&Warning::MissingEntrypoint {
        entrypoint: "nowhere".to_string(),
        container_id: "wf1".to_string(),
    }));
    assert_eq!(graph.edges_of_kind(EdgeType::Entrypoint).count(), 0);
    assert_eq!(graph.edges_of_kind(EdgeType::Unreachable).count(), 1);
}

#[test]
fn test_connector_and_emit_references() {
    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("query")
            .action("query", ActionBuilder::new("connector").action_ref("sentinel.run_query").on_success("other").build())
            .action("other", ActionBuilder::new("connector").action_ref("jira.create_issue").on_success("blank").build())
            .action("blank", ActionBuilder::new("connector").on_success("emit").build())
            .action("emit", ActionBuilder::new("emitEvent").input("sensorName", "hook1").on_success("emit2").build())
            .action("emit2", ActionBuilder::new("emitEvent").input("sensorName", "ghost").on_success("emit3").build())
            .action("emit3", ActionBuilder::new("emitEvent").build())
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let conn = node_of(&graph, NodeType::Connector, "sentinel");
    let query = node_of(&graph, NodeType::ConnectorAction, "query");
    let hook = node_of(&graph, NodeType::Webhook, "hook1");
    let emit = node_of(&graph, NodeType::EmitEventAction, "emit");

    assert_eq!(edges_between(&graph, conn, query, EdgeType::CalledBy), 1);
    assert_eq!(edges_between(&graph, hook, emit, EdgeType::EmittedBy), 1);
    assert_eq!(graph.edges_of_kind(EdgeType::CalledBy).count(), 1);
    assert_eq!(graph.edges_of_kind(EdgeType::EmittedBy).count(), 1);

    // Actions with broken references still exist.
    node_of(&graph, NodeType::EmitEventAction, "emit2");
    node_of(&graph, NodeType::EmitEventAction, "emit3");
    node_of(&graph, NodeType::ConnectorAction, "blank");

    assert!(warnings.contains(&Warning::UnknownConnector {
        action_id: "other".to_string(),
        connector: "jira".to_string(),
    }));
    assert!(warnings.contains(&Warning::MissingConnectorRef {
        action_id: "blank".to_string(),
    }));
    assert!(warnings.contains(&Warning::UnknownEmitSensor {
        action_id: "emit2".to_string(),
        sensor: "ghost".to_string(),
    }));
    assert!(warnings.iter().any(|w| matches!(
        w,
        Warning::EmitReference { action_id, source: ReflectError::NotAnObject { .. } } if action_id == "emit3"
    )));
}

#[test]
fn test_record_action_subtypes() {
    let record = |kind: &str, next: &str| {
        ActionBuilder::new("recordAction")
            .record_type(kind)
            .input("applicationId", "app1")
            .on_success(next)
            .build()
    };

    let state = single_workflow(
        WorkflowBuilder::new("wf1")
            .entrypoint("create")
            .action("create", record("create", "patch"))
            .action("patch", record("patch", "search"))
            .action("search", record("search", "delete"))
            .action("delete", record("delete", "upsert"))
            .action("upsert", record("upsert", "export"))
            .action("export", record("export", "merge"))
            .action("merge", record("merge", "dynamic"))
            .action(
                "dynamic",
                ActionBuilder::new("recordAction")
                    .record_type("create")
                    .inputs(json!({ "applicationId": { "$:ref": "vars.app" } }))
                    .build(),
            )
            .build(),
    );

    let (graph, warnings) = build_graph(&state).expect("Graph build failed");

    let app = node_of(&graph, NodeType::Application, "app1");
    let accessed: Vec<NodeType> = graph
        .out_edges(app)
        .filter(|e| e.kind == EdgeType::AccessedBy)
        .map(|e| graph.node(e.dst).kind())
        .collect();
    assert_eq!(accessed.len(), 7);
    for kind in [
        NodeType::RecordCreateAction,
        NodeType::RecordUpdateAction,
        NodeType::RecordSearchAction,
        NodeType::RecordDeleteAction,
        NodeType::RecordUpsertAction,
        NodeType::RecordExportAction,
        NodeType::RecordAction,
    ] {
        assert!(accessed.contains(&kind), "missing {}", kind);
    }

    assert!(warnings.contains(&Warning::UnknownRecordActionType {
        action_id: "merge".to_string(),
        kind: "merge".to_string(),
    }));
    assert!(warnings.iter().any(|w| matches!(
        w,
        Warning::RecordReference { action_id, source: ReflectError::DynamicReference { .. } } if action_id == "dynamic"
    )));
    node_of(&graph, NodeType::RecordCreateAction, "dynamic");
    assert_eq!(warnings.len(), 2);
}
