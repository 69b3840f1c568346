//! GraphDone CLI: manage work graphs stored as JSON snapshots.
//!
//! Usage:
//!   graphdone graph <subcommand> [--data-dir path]
//!   graphdone node <subcommand> <graph> ...
//!   graphdone edge <subcommand> <graph> ...

use clap::{Parser, Subcommand};
use graphdone::{
    ContributorId, Edge, EdgeId, EdgeQuery, EdgeType, EngineConfig, GraphEngine, GraphError,
    GraphId, GraphStats, JsonFileStore, LogFormat, Metadata, Node, NodeId, NodeQuery, NodeStatus,
    NodeType, PriorityUpdate,
};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "graphdone",
    version,
    about = "Collaborative work graph engine with democratic priorities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding graph snapshots (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log output format: compact or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage graphs
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },
    /// Manage nodes within a graph
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Manage edges within a graph
    Edge {
        #[command(subcommand)]
        action: EdgeAction,
    },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Create a new empty graph
    Create {
        /// Id for the graph; a UUID is generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    /// List all graphs
    List,
    /// Delete a graph
    Delete { graph: String },
    /// Show node, edge, priority, and cycle statistics
    Stats { graph: String },
    /// List dependency cycles
    Cycles { graph: String },
    /// Shortest path between two nodes
    Path {
        graph: String,
        from: String,
        to: String,
    },
}

#[derive(Subcommand)]
enum NodeAction {
    /// Add a node
    Add {
        graph: String,
        title: String,
        /// outcome, task, milestone, or idea
        #[arg(long = "type", default_value = "task")]
        node_type: NodeType,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<NodeStatus>,
        #[arg(long, default_value_t = 0.0)]
        executive: f64,
        #[arg(long, default_value_t = 0.0)]
        individual: f64,
        #[arg(long, default_value_t = 0.0)]
        community: f64,
        /// Contributor id; may be repeated
        #[arg(long = "contributor")]
        contributors: Vec<String>,
    },
    /// List nodes, highest priority first
    List {
        graph: String,
        #[arg(long = "type")]
        node_type: Option<NodeType>,
        #[arg(long)]
        status: Option<NodeStatus>,
        #[arg(long)]
        contributor: Option<String>,
        /// Minimum computed priority
        #[arg(long)]
        min_priority: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Print full node records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one node in full
    Show { graph: String, node: String },
    /// Change a node's title, description, or metadata
    Update {
        graph: String,
        node: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        /// Replacement metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Remove a node and every edge touching it
    Remove { graph: String, node: String },
    /// Set a node's status
    Status {
        graph: String,
        node: String,
        status: NodeStatus,
    },
    /// Update one or more priority components
    Priority {
        graph: String,
        node: String,
        #[arg(long)]
        executive: Option<f64>,
        #[arg(long)]
        individual: Option<f64>,
        #[arg(long)]
        community: Option<f64>,
    },
    /// Raise a node's community priority
    Boost {
        graph: String,
        node: String,
        amount: f64,
        #[arg(long, default_value_t = 1.0)]
        time_factor: f64,
    },
    /// Add or remove a contributor
    Contributor {
        graph: String,
        node: String,
        contributor: String,
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand)]
enum EdgeAction {
    /// Connect two nodes
    Add {
        graph: String,
        source: String,
        target: String,
        /// dependency, blocks, relates_to, or contains
        #[arg(long = "type", default_value = "dependency")]
        edge_type: EdgeType,
        #[arg(long, default_value_t = 1.0)]
        weight: f64,
        #[arg(long)]
        id: Option<String>,
    },
    /// List edges in insertion order
    List {
        graph: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long = "type")]
        edge_type: Option<EdgeType>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Set an edge's weight (clamped to [0, 1])
    Weight {
        graph: String,
        edge: String,
        weight: f64,
    },
    /// Remove an edge by id
    Remove { graph: String, edge: String },
}

fn init_tracing(config: &EngineConfig, format_flag: Option<LogFormat>) {
    let filter = EnvFilter::try_from_env("GRAPHDONE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let format = format_flag
        .or_else(|| {
            env::var("GRAPHDONE_LOG_FORMAT")
                .ok()
                .and_then(|f| f.parse().ok())
        })
        .unwrap_or(config.log_format);

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig, String> {
    let loaded = match path {
        Some(path) => EngineConfig::load(&path),
        None => EngineConfig::load_default(),
    };
    loaded.map_err(|e| format!("Failed to load config: {}", e))
}

fn open_engine(data_dir: &Path) -> Result<GraphEngine, String> {
    let store = JsonFileStore::open(data_dir)
        .map_err(|e| format!("Failed to open data directory: {}", e))?;
    let engine = GraphEngine::with_store(Arc::new(store));
    engine
        .load_all()
        .map_err(|e| format!("Failed to load graphs: {}", e))?;
    Ok(engine)
}

/// Print a result's error to stderr and map it to an exit code
fn report<T>(result: Result<T, GraphError>, on_ok: impl FnOnce(T)) -> i32 {
    match result {
        Ok(value) => {
            on_ok(value);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn require_node(graph: &graphdone::Graph, id: &NodeId) -> Result<(), GraphError> {
    if graph.contains_node(id) {
        Ok(())
    } else {
        Err(GraphError::NodeNotFound(id.clone()))
    }
}

// === Graph commands ===

fn cmd_graph_create(engine: &GraphEngine, id: Option<String>) -> i32 {
    let id = id.map(GraphId::from).unwrap_or_default();
    if engine.has_graph(&id) {
        eprintln!("Error: graph '{}' already exists", id);
        return 1;
    }
    report(engine.upsert_graph(id, graphdone::Graph::new()), |id| {
        println!("Created graph {}", id)
    })
}

fn cmd_graph_list(engine: &GraphEngine) -> i32 {
    let ids = engine.list_graphs();
    if ids.is_empty() {
        println!("No graphs defined.");
        return 0;
    }
    println!("{:<36}  {:>6}  {:>6}", "ID", "NODES", "EDGES");
    println!("{}", "-".repeat(52));
    for id in ids {
        if let Ok((nodes, edges)) = engine.read(&id, |g| (g.node_count(), g.edge_count())) {
            println!("{:<36}  {:>6}  {:>6}", id.as_str(), nodes, edges);
        }
    }
    0
}

fn cmd_graph_delete(engine: &GraphEngine, graph: &GraphId) -> i32 {
    match engine.remove_graph(graph) {
        Ok(Some(_)) => {
            println!("Deleted graph {}", graph);
            0
        }
        Ok(None) => {
            eprintln!("Error: graph '{}' not found", graph);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_graph_stats(engine: &GraphEngine, graph: &GraphId) -> i32 {
    report(engine.read(graph, GraphStats::compute), |stats| {
        println!("Nodes:        {}", stats.node_count);
        println!("Edges:        {}", stats.edge_count);
        println!("Avg priority: {:.3}", stats.avg_priority);
        println!("Cycles:       {}", stats.cycle_count);
    })
}

fn cmd_graph_cycles(engine: &GraphEngine, graph: &GraphId) -> i32 {
    report(engine.read(graph, |g| g.detect_cycles()), |cycles| {
        if cycles.is_empty() {
            println!("No cycles found.");
        }
        for cycle in cycles {
            let ids: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
            println!("{}", ids.join(" -> "));
        }
    })
}

fn cmd_graph_path(engine: &GraphEngine, graph: &GraphId, from: NodeId, to: NodeId) -> i32 {
    match engine.read(graph, |g| g.find_path(&from, &to)) {
        Ok(Some(path)) => {
            let ids: Vec<&str> = path.iter().map(NodeId::as_str).collect();
            println!("{}", ids.join(" -> "));
            0
        }
        Ok(None) => {
            eprintln!("Error: no path from '{}' to '{}'", from, to);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

// === Node commands ===

fn cmd_node_add(engine: &GraphEngine, graph: &GraphId, node: Node) -> i32 {
    let result = engine.mutate(graph, |g| g.add_node(node).id().clone());
    report(result, |id| println!("Added node {}", id))
}

fn cmd_node_list(engine: &GraphEngine, graph: &GraphId, query: NodeQuery, json: bool) -> i32 {
    let offset = query.offset.unwrap_or(0);
    let result = match engine.read(graph, |g| query.execute(g)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if json {
        return match serde_json::to_string_pretty(&result.nodes) {
            Ok(out) => {
                println!("{}", out);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    if result.nodes.is_empty() {
        println!("No matching nodes.");
        return 0;
    }
    println!(
        "{:<36}  {:<9}  {:<11}  {:>8}  TITLE",
        "ID", "TYPE", "STATUS", "PRIORITY"
    );
    println!("{}", "-".repeat(90));
    for node in &result.nodes {
        println!(
            "{:<36}  {:<9}  {:<11}  {:>8.3}  {}",
            node.id().as_str(),
            node.node_type().to_string(),
            node.status().to_string(),
            node.priority().computed,
            node.title()
        );
    }
    if result.has_more(offset) {
        println!(
            "Showing {}-{} of {}",
            offset + 1,
            offset + result.nodes.len(),
            result.total_count
        );
    }
    0
}

fn cmd_node_show(engine: &GraphEngine, graph: &GraphId, node: NodeId) -> i32 {
    let found = engine.read(graph, |g| g.node(&node).cloned());
    let node = match found {
        Ok(Some(node)) => node,
        Ok(None) => {
            eprintln!("Error: node '{}' not found", node);
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match serde_json::to_string_pretty(&node) {
        Ok(out) => {
            println!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Field changes requested by `node update`
struct NodeEdit {
    title: Option<String>,
    /// `Some(None)` clears the description
    description: Option<Option<String>>,
    metadata: Option<Metadata>,
}

fn parse_metadata(raw: &str) -> Result<Metadata, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid metadata JSON: {}", e))
}

fn cmd_node_update(engine: &GraphEngine, graph: &GraphId, node: NodeId, edit: NodeEdit) -> i32 {
    if edit.title.is_none() && edit.description.is_none() && edit.metadata.is_none() {
        eprintln!("Error: nothing to update");
        return 1;
    }
    let result = update_node(engine, graph, &node, |n| {
        if let Some(title) = edit.title {
            n.set_title(title);
        }
        if let Some(description) = edit.description {
            n.set_description(description);
        }
        if let Some(metadata) = edit.metadata {
            n.set_metadata(Some(metadata));
        }
    });
    report(result, |n| println!("Updated node {}", n.id()))
}

fn cmd_node_remove(engine: &GraphEngine, graph: &GraphId, node: NodeId) -> i32 {
    match engine.mutate(graph, |g| g.remove_node(&node)) {
        Ok(true) => {
            println!("Removed node {}", node);
            0
        }
        Ok(false) => {
            eprintln!("Error: node '{}' not found", node);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Apply `f` to one node, failing if it does not exist
fn update_node(
    engine: &GraphEngine,
    graph: &GraphId,
    node: &NodeId,
    f: impl FnOnce(&mut Node),
) -> Result<Node, GraphError> {
    engine.try_mutate(graph, |g| {
        let target = g
            .node_mut(node)
            .ok_or_else(|| GraphError::NodeNotFound(node.clone()))?;
        f(target);
        Ok(target.clone())
    })
}

fn print_priority(node: &Node) {
    let p = node.priority();
    println!(
        "{}: executive {:.3}, individual {:.3}, community {:.3}, computed {:.3}",
        node.id(),
        p.executive,
        p.individual,
        p.community,
        p.computed
    );
}

fn cmd_node_status(engine: &GraphEngine, graph: &GraphId, node: NodeId, status: NodeStatus) -> i32 {
    let result = update_node(engine, graph, &node, |n| n.update_status(status));
    report(result, |n| println!("{} is now {}", n.id(), n.status()))
}

fn cmd_node_priority(
    engine: &GraphEngine,
    graph: &GraphId,
    node: NodeId,
    update: PriorityUpdate,
) -> i32 {
    let result = update_node(engine, graph, &node, |n| n.update_priority(update));
    report(result, |n| print_priority(&n))
}

fn cmd_node_boost(
    engine: &GraphEngine,
    graph: &GraphId,
    node: NodeId,
    amount: f64,
    time_factor: f64,
) -> i32 {
    let result = update_node(engine, graph, &node, |n| n.boost_priority(amount, time_factor));
    report(result, |n| print_priority(&n))
}

fn cmd_node_contributor(
    engine: &GraphEngine,
    graph: &GraphId,
    node: NodeId,
    contributor: ContributorId,
    remove: bool,
) -> i32 {
    let result = engine.try_mutate(graph, |g| {
        let target = g
            .node_mut(&node)
            .ok_or_else(|| GraphError::NodeNotFound(node.clone()))?;
        Ok(if remove {
            target.remove_contributor(&contributor)
        } else {
            target.add_contributor(contributor.clone())
        })
    });
    let verb = if remove { "Removed" } else { "Added" };
    report(result, |changed| {
        if changed {
            println!("{} contributor {} on {}", verb, contributor, node);
        } else {
            println!("No change for contributor {} on {}", contributor, node);
        }
    })
}

// === Edge commands ===

fn cmd_edge_add(engine: &GraphEngine, graph: &GraphId, edge: Edge) -> i32 {
    let result = engine.try_mutate(graph, |g| {
        require_node(g, &edge.source)?;
        require_node(g, &edge.target)?;
        Ok(g.add_edge(edge).id.clone())
    });
    report(result, |id| println!("Added edge {}", id))
}

fn cmd_edge_list(engine: &GraphEngine, graph: &GraphId, query: EdgeQuery) -> i32 {
    let offset = query.offset.unwrap_or(0);
    let result = match engine.read(graph, |g| query.execute(g)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if result.edges.is_empty() {
        println!("No matching edges.");
        return 0;
    }
    println!(
        "{:<36}  {:<36}  {:<36}  {:<10}  {:>6}",
        "ID", "SOURCE", "TARGET", "TYPE", "WEIGHT"
    );
    println!("{}", "-".repeat(134));
    for edge in &result.edges {
        println!(
            "{:<36}  {:<36}  {:<36}  {:<10}  {:>6.3}",
            edge.id.as_str(),
            edge.source.as_str(),
            edge.target.as_str(),
            edge.edge_type.to_string(),
            edge.weight
        );
    }
    if result.has_more(offset) {
        println!(
            "Showing {}-{} of {}",
            offset + 1,
            offset + result.edges.len(),
            result.total_count
        );
    }
    0
}

fn cmd_edge_weight(engine: &GraphEngine, graph: &GraphId, edge: EdgeId, weight: f64) -> i32 {
    let result = engine.try_mutate(graph, |g| {
        if !g.update_edge_weight(&edge, weight) {
            return Err(GraphError::EdgeNotFound(edge.clone()));
        }
        Ok(g.edge(&edge).map(|e| e.weight).unwrap_or(weight))
    });
    report(result, |stored| println!("Edge {} weight is now {:.3}", edge, stored))
}

fn cmd_edge_remove(engine: &GraphEngine, graph: &GraphId, edge: EdgeId) -> i32 {
    let result = engine.try_mutate(graph, |g| {
        if g.remove_edge(&edge) {
            Ok(())
        } else {
            Err(GraphError::EdgeNotFound(edge.clone()))
        }
    });
    report(result, |()| println!("Removed edge {}", edge))
}

fn run(command: Commands, engine: &GraphEngine, config: &EngineConfig) -> i32 {
    match command {
        Commands::Graph { action } => match action {
            GraphAction::Create { id } => cmd_graph_create(engine, id),
            GraphAction::List => cmd_graph_list(engine),
            GraphAction::Delete { graph } => cmd_graph_delete(engine, &graph.into()),
            GraphAction::Stats { graph } => cmd_graph_stats(engine, &graph.into()),
            GraphAction::Cycles { graph } => cmd_graph_cycles(engine, &graph.into()),
            GraphAction::Path { graph, from, to } => {
                cmd_graph_path(engine, &graph.into(), from.into(), to.into())
            }
        },
        Commands::Node { action } => match action {
            NodeAction::Add {
                graph,
                title,
                node_type,
                id,
                description,
                status,
                executive,
                individual,
                community,
                contributors,
            } => {
                let mut builder =
                    Node::builder(title, node_type).priority(executive, individual, community);
                if let Some(id) = id {
                    builder = builder.id(id);
                }
                if let Some(description) = description {
                    builder = builder.description(description);
                }
                if let Some(status) = status {
                    builder = builder.status(status);
                }
                for contributor in contributors {
                    builder = builder.contributor(contributor);
                }
                cmd_node_add(engine, &graph.into(), builder.build())
            }
            NodeAction::List {
                graph,
                node_type,
                status,
                contributor,
                min_priority,
                limit,
                offset,
                json,
            } => {
                let query = NodeQuery {
                    node_type,
                    status,
                    contributor: contributor.map(ContributorId::from),
                    priority_threshold: min_priority,
                    limit: Some(limit.unwrap_or(config.default_limit)),
                    offset: Some(offset),
                };
                cmd_node_list(engine, &graph.into(), query, json)
            }
            NodeAction::Show { graph, node } => cmd_node_show(engine, &graph.into(), node.into()),
            NodeAction::Update {
                graph,
                node,
                title,
                description,
                clear_description,
                metadata,
            } => {
                let metadata = match metadata.as_deref().map(parse_metadata).transpose() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return 1;
                    }
                };
                let description = if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                };
                let edit = NodeEdit {
                    title,
                    description,
                    metadata,
                };
                cmd_node_update(engine, &graph.into(), node.into(), edit)
            }
            NodeAction::Remove { graph, node } => cmd_node_remove(engine, &graph.into(), node.into()),
            NodeAction::Status {
                graph,
                node,
                status,
            } => cmd_node_status(engine, &graph.into(), node.into(), status),
            NodeAction::Priority {
                graph,
                node,
                executive,
                individual,
                community,
            } => {
                let update = PriorityUpdate {
                    executive,
                    individual,
                    community,
                };
                cmd_node_priority(engine, &graph.into(), node.into(), update)
            }
            NodeAction::Boost {
                graph,
                node,
                amount,
                time_factor,
            } => cmd_node_boost(engine, &graph.into(), node.into(), amount, time_factor),
            NodeAction::Contributor {
                graph,
                node,
                contributor,
                remove,
            } => cmd_node_contributor(
                engine,
                &graph.into(),
                node.into(),
                contributor.into(),
                remove,
            ),
        },
        Commands::Edge { action } => match action {
            EdgeAction::Add {
                graph,
                source,
                target,
                edge_type,
                weight,
                id,
            } => {
                let mut edge = Edge::new(source.into(), target.into(), edge_type, weight);
                if let Some(id) = id {
                    edge = edge.with_id(id);
                }
                cmd_edge_add(engine, &graph.into(), edge)
            }
            EdgeAction::List {
                graph,
                source,
                target,
                edge_type,
                limit,
                offset,
            } => {
                let query = EdgeQuery {
                    source: source.map(NodeId::from),
                    target: target.map(NodeId::from),
                    edge_type,
                    limit: Some(limit.unwrap_or(config.default_limit)),
                    offset: Some(offset),
                };
                cmd_edge_list(engine, &graph.into(), query)
            }
            EdgeAction::Weight {
                graph,
                edge,
                weight,
            } => cmd_edge_weight(engine, &graph.into(), edge.into(), weight),
            EdgeAction::Remove { graph, edge } => cmd_edge_remove(engine, &graph.into(), edge.into()),
        },
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(&config, cli.log_format);

    let engine = match open_engine(&config.data_dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = run(cli.command, &engine, &config);
    std::process::exit(code);
}
