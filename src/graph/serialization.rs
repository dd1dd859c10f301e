use anyhow::{ensure, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::graph::model::Graph;

/// Wire representation of a graph: node count plus the strict upper-triangle
/// edge list. Round-trips losslessly for any per-graph size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGraph {
    pub node_count: usize,
    pub edges: Vec<(usize, usize)>,
}

/// Persisted dataset artifact: one graph list paired with one label list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    pub graphs: Vec<RawGraph>,
    pub labels: Vec<i64>,
}

impl RawGraph {
    pub fn from_graph(graph: &Graph) -> RawGraph {
        let n = graph.node_count();
        let adjacency = graph.adjacency();
        let mut edges = Vec::with_capacity(graph.edge_count());
        for i in 0..n {
            for j in (i + 1)..n {
                if adjacency[(i, j)] == 1.0 {
                    edges.push((i, j));
                }
            }
        }
        RawGraph {
            node_count: n,
            edges,
        }
    }

    pub fn into_graph(self) -> Result<Graph> {
        let n = self.node_count;
        let mut adjacency = DMatrix::zeros(n, n);
        for (source, target) in self.edges {
            ensure!(
                source < n && target < n,
                "edge ({}, {}) references a node outside 0..{}",
                source,
                target,
                n
            );
            ensure!(
                source != target,
                "edge ({}, {}) is a self-loop, which simple graphs forbid",
                source,
                target
            );
            adjacency[(source, target)] = 1.0;
            adjacency[(target, source)] = 1.0;
        }
        Ok(Graph::from_adjacency_unchecked(adjacency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> Graph {
        let mut adjacency = DMatrix::zeros(n, n);
        for i in 0..n - 1 {
            adjacency[(i, i + 1)] = 1.0;
            adjacency[(i + 1, i)] = 1.0;
        }
        Graph::from_adjacency(adjacency).expect("path graph")
    }

    #[test]
    fn raw_graph_round_trips() {
        let graph = path_graph(5);
        let raw = RawGraph::from_graph(&graph);
        assert_eq!(raw.node_count, 5);
        assert_eq!(raw.edges.len(), 4);
        let restored = raw.into_graph().expect("restore");
        assert_eq!(&graph, &restored);
    }

    #[test]
    fn out_of_bounds_edge_is_rejected() {
        let raw = RawGraph {
            node_count: 3,
            edges: vec![(0, 3)],
        };
        assert!(raw.into_graph().is_err());
    }

    #[test]
    fn self_loop_edge_is_rejected() {
        let raw = RawGraph {
            node_count: 3,
            edges: vec![(1, 1)],
        };
        assert!(raw.into_graph().is_err());
    }
}
