use clap::{Parser, Subcommand};
use lanegraph::analyzer::{AccessAction, Analyzer, TriggerAction};
use lanegraph::config::{self, Config};
use lanegraph::dump::{loader, LaneState};
use lanegraph::graph::{build_graph, EdgeType, Graph, NodeId, NodeType, Warning};
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration directory (defaults to $LANEGRAPH_CONFIG_DIR or ~/.lanegraph)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph of a dump and print a summary
    Analyze {
        /// Path to the dump JSON file
        #[arg(long)]
        infile: PathBuf,
    },
    /// Show what triggers and touches an application
    App {
        #[arg(long)]
        infile: PathBuf,
        app_id: String,
        /// Only actions that modify this field key
        #[arg(long)]
        field: Option<String>,
    },
    /// Show callers and callees of a component
    Component {
        #[arg(long)]
        infile: PathBuf,
        component_id: String,
    },
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = match &cli.config_dir {
        Some(dir) => Some(dir.clone()),
        None => config::config_dir(false).ok(),
    };
    let cfg = match &config_dir {
        Some(dir) => Config::load_or_default(dir)?,
        None => Config::default(),
    };

    let level = if cli.verbose { Level::DEBUG } else { cfg.level()? };
    config::init_logging(level)?;

    match cli.command {
        Commands::Analyze { infile } => analyze(&infile),
        Commands::App { infile, app_id, field } => app(&infile, &app_id, field.as_deref()),
        Commands::Component { infile, component_id } => component(&infile, &component_id),
        Commands::Config { action: ConfigCommand::Show } => {
            show_config(config_dir.as_deref(), &cfg);
            Ok(())
        }
    }
}

fn load_graph(infile: &Path) -> Result<(LaneState, Graph, Vec<Warning>)> {
    let state = loader::load_from_disk(infile)?;
    let (graph, warnings) = build_graph(&state)?;
    for warning in &warnings {
        warn!(%warning, "graph warning");
    }
    info!(warnings = warnings.len(), "graph ready");
    Ok((state, graph, warnings))
}

fn describe(graph: &Graph, node: NodeId) -> String {
    let node = graph.node(node);
    format!("{} ({}: {})", node.label(), node.kind(), node.id())
}

fn describe_opt(graph: &Graph, node: Option<NodeId>) -> String {
    node.map(|n| describe(graph, n)).unwrap_or_else(|| "-".to_string())
}

fn analyze(infile: &Path) -> Result<()> {
    let (state, graph, warnings) = load_graph(infile)?;

    let unreachable = warnings
        .iter()
        .filter(|w| matches!(w, Warning::UnreachableAction { .. }))
        .count();
    let res = &graph.resources;

    println!("Tenant:       {} ({})", state.tenant.name, state.tenant.id);
    println!("Snapshot:     {}", state.time_stamp);
    println!("Applications: {}", res.apps_by_id.len());
    println!("Playbooks:    {}", res.playbooks_by_id.len());
    println!("Components:   {}", res.components_by_id.len());
    println!("Connectors:   {}", res.connectors_by_id.len());
    println!("Triggers:     {}", res.triggers_by_id.len());
    println!("Workflows:    {}", graph.nodes_of_kind(NodeType::Workflow).count());
    println!("Nodes:        {}", graph.node_count());
    println!("Edges:        {}", graph.edge_count());
    println!("Warnings:     {}", warnings.len());
    println!("Unreachable:  {} ({} edges)", unreachable, graph.edges_of_kind(EdgeType::Unreachable).count());
    Ok(())
}

fn print_triggers(graph: &Graph, title: &str, triggers: &[TriggerAction]) {
    println!("{}:", title);
    for t in triggers {
        println!(
            "  {} -> {} in {} [{}]",
            describe(graph, t.trigger),
            describe_opt(graph, t.workflow),
            describe_opt(graph, t.playbook),
            t.status()
        );
    }
}

fn print_access(graph: &Graph, rows: &[AccessAction]) {
    for row in rows {
        let owner = if row.is_component_action() {
            describe_opt(graph, row.component)
        } else {
            format!("{} [{}]", describe_opt(graph, row.playbook), if row.enabled { "enabled" } else { "disabled" })
        };
        print!("  {} in {} of {}", describe(graph, row.action), describe(graph, row.workflow), owner);
        match &row.inspection_error {
            Some(err) => println!(" (inspection error: {})", err),
            None => println!(),
        }
    }
}

fn app(infile: &Path, app_id: &str, field: Option<&str>) -> Result<()> {
    let (state, graph, _) = load_graph(infile)?;
    let analyzer = Analyzer::new(&state, &graph);

    let app = *graph
        .resources
        .apps_by_id
        .get(app_id)
        .ok_or_else(|| anyhow!("Application {} not found", app_id))?;
    println!("{}", describe(&graph, app));

    if let Some(key) = field {
        let field = analyzer
            .application_resource(app)
            .and_then(|a| a.field_by_key(key))
            .ok_or_else(|| anyhow!("Field {} not found on application {}", key, app_id))?;
        println!("Modified by ({}):", field.name);
        print_access(&graph, &analyzer.application_field_modified_by(app, field));
        return Ok(());
    }

    let triggers = analyzer.application_triggers(app);
    print_triggers(&graph, "Buttons", &triggers.buttons);
    print_triggers(&graph, "Record events", &triggers.record_events);

    println!("Accessed by:");
    print_access(&graph, &analyzer.application_accessed_by(app));
    Ok(())
}

fn component(infile: &Path, component_id: &str) -> Result<()> {
    let (state, graph, _) = load_graph(infile)?;
    let analyzer = Analyzer::new(&state, &graph);

    let comp = *graph
        .resources
        .components_by_id
        .get(component_id)
        .ok_or_else(|| anyhow!("Component {} not found", component_id))?;
    println!("{}", describe(&graph, comp));

    let called_by = analyzer.component_called_by(comp);
    println!("Called by components:");
    for &c in &called_by.components {
        println!("  {}", describe(&graph, c));
    }
    println!("Called by playbooks:");
    for (&pb, workflows) in &called_by.playbook_workflows {
        println!("  {}", describe(&graph, pb));
        for &wf in workflows {
            println!("    {}", describe(&graph, wf));
        }
    }

    println!("Calls:");
    for c in graph.sort_by_label(analyzer.component_calls(comp)) {
        println!("  {}", describe(&graph, c));
    }
    Ok(())
}

fn show_config(dir: Option<&Path>, cfg: &Config) {
    match dir {
        Some(dir) => println!("Directory:    {}", dir.display()),
        None => println!("Directory:    (none)"),
    }
    println!("Region:       {}", cfg.region);
    println!("Host:         {}", cfg.fqdn());
    println!("Account:      {}", cfg.account_id);
    println!("Token:        {}", cfg.masked_token());
    println!("Log level:    {}", cfg.log_level);
    if let Err(err) = cfg.validate() {
        println!("Invalid:      {}", err);
    }
}
