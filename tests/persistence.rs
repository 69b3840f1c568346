//! Engine and store integration: mutations survive a reopen

mod common;

use common::{add_task, depend, id, names};
use graphdone::{
    EdgeId, EdgeQuery, EdgeType, GraphEngine, GraphError, GraphId, GraphStats, GraphStore,
    JsonFileStore, MemoryStore, NodeQuery, NodeStatus, PriorityUpdate,
};
use std::sync::Arc;
use tempfile::TempDir;

fn json_engine(dir: &TempDir) -> GraphEngine {
    let store = JsonFileStore::open(dir.path()).unwrap();
    let engine = GraphEngine::with_store(Arc::new(store));
    engine.load_all().unwrap();
    engine
}

#[test]
fn mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let graph_id = GraphId::from("roadmap");

    {
        let engine = json_engine(&dir);
        engine.upsert_graph(graph_id.clone(), Default::default()).unwrap();
        engine
            .mutate(&graph_id, |g| {
                add_task(g, "design", 0.8);
                add_task(g, "build", 0.5);
                add_task(g, "ship", 0.2);
                depend(g, "design", "build");
                depend(g, "build", "ship");
            })
            .unwrap();
        engine
            .mutate(&graph_id, |g| {
                let node = g.node_mut(&id("ship")).unwrap();
                node.update_status(NodeStatus::Blocked);
                node.update_priority(PriorityUpdate::new().executive(1.0));
            })
            .unwrap();
    }

    let engine = json_engine(&dir);
    assert_eq!(engine.list_graphs(), vec![graph_id.clone()]);

    let (path, ship_status, stats) = engine
        .read(&graph_id, |g| {
            (
                g.find_path(&id("design"), &id("ship")),
                g.node(&id("ship")).map(|n| n.status()),
                GraphStats::compute(g),
            )
        })
        .unwrap();

    assert_eq!(names(&path.unwrap()), vec!["design", "build", "ship"]);
    assert_eq!(ship_status, Some(NodeStatus::Blocked));
    assert_eq!(stats.node_count, 3);
    assert_eq!(stats.edge_count, 2);
    assert_eq!(stats.cycle_count, 0);
}

#[test]
fn failed_mutation_is_not_persisted() {
    let store = Arc::new(MemoryStore::new());
    let engine = GraphEngine::with_store(store.clone());
    let graph_id = engine.create_graph().unwrap();

    let result: Result<(), GraphError> = engine.try_mutate(&graph_id, |g| {
        add_task(g, "draft", 0.5);
        Err(GraphError::NodeNotFound(id("missing")))
    });

    assert!(matches!(result, Err(GraphError::NodeNotFound(_))));
    let stored = store.load_graph(&graph_id).unwrap().unwrap();
    assert!(stored.nodes.is_empty());
}

#[test]
fn removed_graph_is_gone_after_reopen() {
    let dir = TempDir::new().unwrap();
    let graph_id = {
        let engine = json_engine(&dir);
        let graph_id = engine.create_graph().unwrap();
        assert!(engine.remove_graph(&graph_id).unwrap().is_some());
        graph_id
    };

    let engine = json_engine(&dir);
    assert!(!engine.has_graph(&graph_id));
    assert!(matches!(
        engine.read(&graph_id, |g| g.node_count()),
        Err(GraphError::GraphNotFound(_))
    ));
}

#[test]
fn node_query_over_persisted_graph() {
    let dir = TempDir::new().unwrap();
    let graph_id = GraphId::from("team/q3");

    {
        let engine = json_engine(&dir);
        engine.upsert_graph(graph_id.clone(), Default::default()).unwrap();
        engine
            .mutate(&graph_id, |g| {
                for (name, priority) in [("low", 0.1), ("high", 0.9), ("mid", 0.5)] {
                    add_task(g, name, priority);
                }
            })
            .unwrap();
    }

    let engine = json_engine(&dir);
    let result = engine
        .read(&graph_id, |g| {
            NodeQuery::new().with_priority_threshold(0.4).limit(1).execute(g)
        })
        .unwrap();

    assert_eq!(result.total_count, 2);
    assert_eq!(result.nodes.len(), 1);
    assert_eq!(result.nodes[0].id().as_str(), "high");
}

#[test]
fn edge_weight_and_node_edits_persist() {
    let dir = TempDir::new().unwrap();
    let graph_id = GraphId::from("edits");

    {
        let engine = json_engine(&dir);
        engine.upsert_graph(graph_id.clone(), Default::default()).unwrap();
        engine
            .mutate(&graph_id, |g| {
                add_task(g, "a", 0.5);
                add_task(g, "b", 0.5);
                depend(g, "a", "b");
            })
            .unwrap();

        let edge = EdgeId::from("a->b");
        let stored = engine
            .try_mutate(&graph_id, |g| {
                if !g.update_edge_weight(&edge, 1.7) {
                    return Err(GraphError::EdgeNotFound(edge.clone()));
                }
                let node = g.node_mut(&id("a")).unwrap();
                node.set_title("Alpha");
                node.set_description(Some("first".to_string()));
                Ok(g.edge(&edge).map(|e| e.weight))
            })
            .unwrap();
        assert_eq!(stored, Some(1.0));

        let missing = EdgeId::from("nope");
        let err = engine
            .try_mutate(&graph_id, |g| {
                g.update_edge_weight(&missing, 0.5)
                    .then_some(())
                    .ok_or(GraphError::EdgeNotFound(missing.clone()))
            })
            .unwrap_err();
        assert!(matches!(err, GraphError::EdgeNotFound(_)));
    }

    let engine = json_engine(&dir);
    let (edges, title, description) = engine
        .read(&graph_id, |g| {
            let node = g.node(&id("a")).unwrap();
            (
                EdgeQuery::new()
                    .with_source("a")
                    .with_edge_type(EdgeType::Dependency)
                    .execute(g),
                node.title().to_string(),
                node.description().map(str::to_string),
            )
        })
        .unwrap();

    assert_eq!(edges.total_count, 1);
    assert_eq!(edges.edges[0].weight, 1.0);
    assert_eq!(title, "Alpha");
    assert_eq!(description.as_deref(), Some("first"));
}
