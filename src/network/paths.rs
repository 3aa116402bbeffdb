//! Graph-distance helpers backed by `petgraph`.

use ndarray::Array2;
use petgraph::algo::{connected_components as count_components, dijkstra};
use petgraph::graph::{DiGraph, NodeIndex};

use super::SocialNetwork;

/// Convert to a `petgraph` digraph, one arc per non-zero entry.
///
/// Undirected networks are symmetric, so both arcs of each tie appear and
/// reachability matches the undirected graph.
pub fn to_graph(network: &SocialNetwork) -> DiGraph<usize, f64> {
    let n = network.len();
    let mut graph = DiGraph::with_capacity(n, network.tie_count() * 2);
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();
    for ((i, j), &w) in network.adjacency().indexed_iter() {
        if w > 0.0 {
            graph.add_edge(nodes[i], nodes[j], w);
        }
    }
    graph
}

/// Hop-count shortest path between every pair; `NaN` when unreachable.
pub fn distance_matrix(network: &SocialNetwork) -> Array2<f64> {
    let n = network.len();
    let graph = to_graph(network);
    let mut distances = Array2::from_elem((n, n), f64::NAN);

    for source in graph.node_indices() {
        let hops = dijkstra(&graph, source, None, |_| 1usize);
        for (target, d) in hops {
            distances[[source.index(), target.index()]] = d as f64;
        }
    }
    distances
}

/// Number of (weakly) connected components.
pub fn connected_components(network: &SocialNetwork) -> usize {
    count_components(&to_graph(network))
}
