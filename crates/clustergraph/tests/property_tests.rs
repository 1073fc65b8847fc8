use clustergraph::{ClusterGraph, ClusterId, Error, GlobalVertex, LocalEdge, LocalVertex};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Operation {
    AddVertex { cluster: usize },
    AddEdge { a: usize, b: usize },
    AddLocalEdge { cluster: usize, a: usize, b: usize },
    CreateSubcluster { cluster: usize },
    MoveDown { vertex: usize, child: usize },
    MoveUp { vertex: usize },
    RemoveVertex { vertex: usize },
    RemoveCluster { parent: usize, cluster: usize },
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (0usize..8).prop_map(|cluster| Operation::AddVertex { cluster }),
        3 => (0usize..32, 0usize..32).prop_map(|(a, b)| Operation::AddEdge { a, b }),
        2 => (0usize..8, 0usize..16, 0usize..16)
            .prop_map(|(cluster, a, b)| Operation::AddLocalEdge { cluster, a, b }),
        2 => (0usize..8).prop_map(|cluster| Operation::CreateSubcluster { cluster }),
        3 => (0usize..32, 0usize..8).prop_map(|(vertex, child)| Operation::MoveDown { vertex, child }),
        2 => (0usize..32).prop_map(|vertex| Operation::MoveUp { vertex }),
        1 => (0usize..32).prop_map(|vertex| Operation::RemoveVertex { vertex }),
        1 => (0usize..8, 0usize..8).prop_map(|(parent, cluster)| Operation::RemoveCluster { parent, cluster }),
    ]
}

/// Live clusters of the tree, root first.
fn clusters(graph: &ClusterGraph) -> Vec<ClusterId> {
    let mut out = vec![graph.root()];
    let mut i = 0;
    while i < out.len() {
        out.extend(graph.clusters(out[i]).map(|(_, child)| child));
        i += 1;
    }
    out
}

/// Every vertex, cluster vertices included, with its owning cluster.
fn all_vertices(graph: &ClusterGraph) -> Vec<(ClusterId, LocalVertex)> {
    clusters(graph)
        .into_iter()
        .flat_map(|c| graph.vertices(c).map(move |v| (c, v)))
        .collect()
}

/// Every ordinary vertex with its owning cluster.
fn ordinary_vertices(graph: &ClusterGraph) -> Vec<(ClusterId, LocalVertex, GlobalVertex)> {
    let mut out = Vec::new();
    for (c, v) in all_vertices(graph) {
        if !graph.is_cluster(c, v) {
            if let Some(g) = graph.global_vertex(c, v) {
                out.push((c, v, g));
            }
        }
    }
    out
}

#[derive(Debug, PartialEq)]
struct ClusterSnapshot {
    id: ClusterId,
    vertices: Vec<(LocalVertex, Option<GlobalVertex>)>,
    edges: Vec<(LocalEdge, Option<(LocalVertex, LocalVertex)>, Vec<u64>)>,
    children: Vec<(LocalVertex, ClusterId)>,
}

/// The whole tree, local handles included.
fn snapshot(graph: &ClusterGraph) -> Vec<ClusterSnapshot> {
    clusters(graph)
        .into_iter()
        .map(|c| ClusterSnapshot {
            id: c,
            vertices: graph.vertices(c).map(|v| (v, graph.global_vertex(c, v))).collect(),
            edges: graph
                .edges(c)
                .map(|e| {
                    let ids = graph.global_edges(c, e).map(|g| g.id).collect();
                    (e, graph.edge_endpoints(c, e), ids)
                })
                .collect(),
            children: graph.clusters(c).collect(),
        })
        .collect()
}

/// Applies one operation. Operations that are valid by construction must
/// succeed; the others may fail and are returned as is.
fn apply(graph: &mut ClusterGraph, op: &Operation) -> Result<(), Error> {
    let root = graph.root();
    match *op {
        Operation::AddVertex { cluster } => {
            let all = clusters(graph);
            graph.add_vertex(all[cluster % all.len()]).unwrap();
            Ok(())
        }
        Operation::AddEdge { a, b } => {
            let vertices = ordinary_vertices(graph);
            if vertices.is_empty() {
                return Ok(());
            }
            let (_, _, ga) = vertices[a % vertices.len()];
            let (_, _, gb) = vertices[b % vertices.len()];
            graph.add_edge_global(root, ga, gb).map(|_| ())
        }
        Operation::AddLocalEdge { cluster, a, b } => {
            let all = clusters(graph);
            let c = all[cluster % all.len()];
            let vertices: Vec<LocalVertex> = graph.vertices(c).collect();
            if vertices.is_empty() {
                return Ok(());
            }
            let (a, b) = (vertices[a % vertices.len()], vertices[b % vertices.len()]);
            let valid = a != b && !graph.is_cluster(c, a) && !graph.is_cluster(c, b);
            let result = graph.add_edge(c, a, b).map(|_| ());
            if valid {
                result.unwrap();
                return Ok(());
            }
            result
        }
        Operation::CreateSubcluster { cluster } => {
            let all = clusters(graph);
            graph.create_subcluster(all[cluster % all.len()]).unwrap();
            Ok(())
        }
        Operation::MoveDown { vertex, child } => {
            let vertices = all_vertices(graph);
            if vertices.is_empty() {
                return Ok(());
            }
            let (c, v) = vertices[vertex % vertices.len()];
            let children: Vec<ClusterId> = graph.clusters(c).map(|(_, child)| child).collect();
            if children.is_empty() {
                return Ok(());
            }
            let target = children[child % children.len()];
            if graph.cluster_vertex(target) == Some(v) {
                return graph.move_to_subcluster(c, v, target).map(|_| ());
            }
            graph.move_to_subcluster(c, v, target).unwrap();
            Ok(())
        }
        Operation::MoveUp { vertex } => {
            let vertices = all_vertices(graph);
            if vertices.is_empty() {
                return Ok(());
            }
            let (c, v) = vertices[vertex % vertices.len()];
            if graph.is_root(c) {
                return graph.move_to_parent(c, v).map(|_| ());
            }
            graph.move_to_parent(c, v).unwrap();
            Ok(())
        }
        Operation::RemoveVertex { vertex } => {
            let vertices = ordinary_vertices(graph);
            if vertices.is_empty() {
                return Ok(());
            }
            let (_, _, g) = vertices[vertex % vertices.len()];
            graph.remove_vertex_global(root, g, |_| {}).unwrap();
            Ok(())
        }
        Operation::RemoveCluster { parent, cluster } => {
            let all = clusters(graph);
            let (p, c) = (all[parent % all.len()], all[cluster % all.len()]);
            let valid = graph.parent(c) == Some(p);
            let result = graph.remove_cluster(p, c, |_| {});
            if valid {
                result.unwrap();
                return Ok(());
            }
            result
        }
    }
}

/// Every stored global edge lives at the lowest cluster where its endpoints
/// are distinct, and no two clusters store the same global edge.
fn check_edges(graph: &ClusterGraph) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for c in clusters(graph) {
        for e in graph.edges(c) {
            prop_assert!(graph.global_edge_count(c, e) > 0);
            let (x, y) = graph.edge_endpoints(c, e).unwrap();
            for ge in graph.global_edges(c, e) {
                prop_assert!(seen.insert(ge.id), "edge {} stored twice", ge);
                let a = graph.local_vertex(c, ge.source, true);
                let b = graph.local_vertex(c, ge.target, true);
                prop_assert!(a.is_some() && b.is_some(), "edge {} dangles in {}", ge, c);
                let (a, b) = (a.unwrap(), b.unwrap());
                prop_assert_ne!(a, b);
                prop_assert!((a, b) == (x, y) || (a, b) == (y, x));
            }
        }
    }
    Ok(())
}

/// Runs `ops`; a failing operation must leave the tree exactly as it was.
fn run(graph: &mut ClusterGraph, ops: &[Operation], check_each: bool) -> Result<(), TestCaseError> {
    for op in ops {
        let before = snapshot(graph);
        if let Err(err) = apply(graph, op) {
            prop_assert!(!matches!(err, Error::Cluster(_)), "{:?} broke the tree: {}", op, err);
            let after = snapshot(graph);
            prop_assert_eq!(before, after, "{:?} failed with {} but changed the tree", op, err);
        }
        if check_each {
            check_edges(graph)?;
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_global_ids_are_unique(ops in prop::collection::vec(arb_operation(), 1..60)) {
        let mut graph = ClusterGraph::default();
        run(&mut graph, &ops, false)?;

        let mut ids = HashSet::new();
        for c in clusters(&graph) {
            for g in graph.global_vertices(c) {
                prop_assert!(g.is_valid());
                prop_assert!(ids.insert(g.as_u64()));
            }
            for e in graph.edges(c) {
                for ge in graph.global_edges(c, e) {
                    prop_assert!(ids.insert(ge.id));
                }
            }
        }
    }

    #[test]
    fn prop_edges_live_at_lowest_common_cluster(ops in prop::collection::vec(arb_operation(), 1..60)) {
        let mut graph = ClusterGraph::default();
        run(&mut graph, &ops, true)?;
    }

    #[test]
    fn prop_local_global_round_trip(ops in prop::collection::vec(arb_operation(), 1..40)) {
        let mut graph = ClusterGraph::default();
        run(&mut graph, &ops, false)?;
        for (c, v, g) in ordinary_vertices(&graph) {
            prop_assert_eq!(graph.local_vertex(c, g, false), Some(v));
            prop_assert_eq!(graph.vertex_owner(graph.root(), g), Some((c, v)));
        }
    }
}
