use anyhow::{ensure, Result};
use nalgebra::DMatrix;
use petgraph::graph::{NodeIndex, UnGraph};

/// Simple undirected graph held as a dense 0/1 adjacency matrix.
///
/// Invariants: square, symmetric, binary entries, zero diagonal. The
/// validated constructor enforces all four; once built the graph is an
/// immutable artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    adjacency: DMatrix<f64>,
}

impl Graph {
    /// Build a graph from an adjacency matrix, validating every invariant.
    pub fn from_adjacency(adjacency: DMatrix<f64>) -> Result<Graph> {
        ensure!(
            adjacency.is_square(),
            "adjacency matrix must be square, got {}x{}",
            adjacency.nrows(),
            adjacency.ncols()
        );
        let n = adjacency.nrows();
        for i in 0..n {
            ensure!(
                adjacency[(i, i)] == 0.0,
                "self-loop at node {}: adjacency diagonal must be zero",
                i
            );
            for j in (i + 1)..n {
                let value = adjacency[(i, j)];
                ensure!(
                    value == 0.0 || value == 1.0,
                    "adjacency entry at ({}, {}) must be 0 or 1, got {}",
                    i,
                    j,
                    value
                );
                ensure!(
                    value == adjacency[(j, i)],
                    "adjacency matrix must be symmetric at ({}, {})",
                    i,
                    j
                );
            }
        }
        Ok(Graph { adjacency })
    }

    /// Internal constructor for matrices that are symmetric, binary and
    /// loop-free by construction (samplers mirror the upper triangle).
    pub(crate) fn from_adjacency_unchecked(adjacency: DMatrix<f64>) -> Graph {
        debug_assert!(adjacency.is_square());
        Graph { adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.nrows()
    }

    pub fn edge_count(&self) -> usize {
        let n = self.node_count();
        let mut count = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.adjacency[(i, j)] == 1.0 {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn degree(&self, node: usize) -> f64 {
        self.adjacency.row(node).sum()
    }

    pub fn degrees(&self) -> Vec<f64> {
        (0..self.node_count()).map(|i| self.degree(i)).collect()
    }

    pub fn adjacency(&self) -> &DMatrix<f64> {
        &self.adjacency
    }

    /// Export to a petgraph structure for external consumers such as
    /// graph2vec-style embedders.
    pub fn to_petgraph(&self) -> UnGraph<(), ()> {
        let n = self.node_count();
        let mut graph = UnGraph::with_capacity(n, self.edge_count());
        let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.adjacency[(i, j)] == 1.0 {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asymmetric_adjacency_is_rejected() {
        let mut adjacency = DMatrix::zeros(3, 3);
        adjacency[(0, 1)] = 1.0;
        assert!(Graph::from_adjacency(adjacency).is_err());
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut adjacency = DMatrix::zeros(2, 2);
        adjacency[(0, 0)] = 1.0;
        assert!(Graph::from_adjacency(adjacency).is_err());
    }

    #[test]
    fn non_binary_entry_is_rejected() {
        let mut adjacency = DMatrix::zeros(2, 2);
        adjacency[(0, 1)] = 0.5;
        adjacency[(1, 0)] = 0.5;
        assert!(Graph::from_adjacency(adjacency).is_err());
    }

    #[test]
    fn degrees_and_petgraph_export_agree() {
        let mut adjacency = DMatrix::zeros(3, 3);
        for (i, j) in [(0, 1), (1, 2)] {
            adjacency[(i, j)] = 1.0;
            adjacency[(j, i)] = 1.0;
        }
        let graph = Graph::from_adjacency(adjacency).expect("valid path graph");
        assert_eq!(graph.degrees(), vec![1.0, 2.0, 1.0]);
        assert_eq!(graph.edge_count(), 2);

        let exported = graph.to_petgraph();
        assert_eq!(exported.node_count(), 3);
        assert_eq!(exported.edge_count(), 2);
    }
}
