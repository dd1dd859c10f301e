use std::cmp::Ordering;

use anyhow::{ensure, Result};
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::graph::Graph;

/// Degree-sorted histogram estimator: summarizes an observed adjacency
/// matrix as a coarse n0×n0 graphon estimate by block-averaged densities.
pub struct HistogramEstimator;

impl HistogramEstimator {
    /// Approximate the generating graphon of `graph` at resolution `n0`.
    ///
    /// Nodes are sorted by descending degree (stable, so ties keep their
    /// original order and the estimate is deterministic), rows and columns
    /// are permuted together, and the sorted matrix is cut into an n0×n0
    /// grid of h×h blocks with `h = n / n0`. Rows and columns beyond
    /// `n0 * h` are dropped, not redistributed. Each block mean lands in
    /// both triangles, so the result is symmetric with entries in [0,1].
    pub fn hist_approximate(graph: &Graph, n0: usize) -> Result<DMatrix<f64>> {
        ensure!(n0 > 0, "histogram resolution n0 must be positive");
        let n = graph.node_count();
        ensure!(
            n >= n0,
            "graph with {} nodes cannot be binned at resolution {}",
            n,
            n0
        );
        let h = n / n0;
        debug!("binning {} nodes into {} blocks of size {}", n, n0, h);

        let degrees = graph.degrees();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            degrees[b]
                .partial_cmp(&degrees[a])
                .unwrap_or(Ordering::Equal)
        });

        let adjacency = graph.adjacency();
        let sorted = DMatrix::from_fn(n, n, |i, j| adjacency[(order[i], order[j])]);

        let mut estimate = DMatrix::zeros(n0, n0);
        for i in 0..n0 {
            for j in 0..=i {
                let block = sorted.view((i * h, j * h), (h, h));
                let mean = block.sum() / (h * h) as f64;
                estimate[(i, j)] = mean;
                estimate[(j, i)] = mean;
            }
        }
        Ok(estimate)
    }

    /// Histogram estimates for a batch of graphs at a shared resolution.
    pub fn histogram_embeddings(graphs: &[Graph], n0: usize) -> Result<Vec<DMatrix<f64>>> {
        graphs
            .par_iter()
            .map(|graph| Self::hist_approximate(graph, n0))
            .collect()
    }

    /// Flatten a histogram estimate into the crate's own fixed-length
    /// embedding: a row-major vector of n0·n0 densities.
    pub fn flatten_embedding(histogram: &DMatrix<f64>) -> Vec<f64> {
        let mut flat = Vec::with_capacity(histogram.nrows() * histogram.ncols());
        for i in 0..histogram.nrows() {
            for j in 0..histogram.ncols() {
                flat.push(histogram[(i, j)]);
            }
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_graph(n: usize) -> Graph {
        let mut adjacency = DMatrix::from_element(n, n, 1.0);
        for i in 0..n {
            adjacency[(i, i)] = 0.0;
        }
        Graph::from_adjacency(adjacency).expect("complete graph")
    }

    fn star_graph(n: usize) -> Graph {
        let mut adjacency = DMatrix::zeros(n, n);
        for i in 1..n {
            adjacency[(0, i)] = 1.0;
            adjacency[(i, 0)] = 1.0;
        }
        Graph::from_adjacency(adjacency).expect("star graph")
    }

    #[test]
    fn complete_four_node_graph_bins_to_ones() {
        // Hand computation for K4 with h = 2: the diagonal blocks are
        // [[0,1],[1,0]] with mean 0.5, the off-diagonal block is all ones.
        let estimate =
            HistogramEstimator::hist_approximate(&complete_graph(4), 2).expect("estimate");
        assert_eq!(estimate.nrows(), 2);
        assert_eq!(estimate.ncols(), 2);
        assert_eq!(estimate[(0, 0)], 0.5);
        assert_eq!(estimate[(1, 1)], 0.5);
        assert_eq!(estimate[(0, 1)], 1.0);
        assert_eq!(estimate[(1, 0)], 1.0);
    }

    #[test]
    fn output_is_symmetric_with_unit_interval_entries() {
        let estimate = HistogramEstimator::hist_approximate(&star_graph(9), 3).expect("estimate");
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(estimate[(i, j)], estimate[(j, i)]);
                assert!((0.0..=1.0).contains(&estimate[(i, j)]));
            }
        }
    }

    #[test]
    fn estimation_is_deterministic() {
        let graph = star_graph(10);
        let first = HistogramEstimator::hist_approximate(&graph, 5).expect("first");
        let second = HistogramEstimator::hist_approximate(&graph, 5).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn remainder_rows_are_dropped() {
        // 7 nodes at resolution 3 gives h = 2; node 7 never contributes.
        let estimate = HistogramEstimator::hist_approximate(&complete_graph(7), 3).expect("estimate");
        assert_eq!(estimate.nrows(), 3);
        assert!(estimate.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn undersized_graph_is_rejected() {
        assert!(HistogramEstimator::hist_approximate(&complete_graph(4), 5).is_err());
        assert!(HistogramEstimator::hist_approximate(&complete_graph(4), 0).is_err());
    }

    #[test]
    fn flattened_embedding_has_fixed_length() {
        let estimate = HistogramEstimator::hist_approximate(&complete_graph(6), 3).expect("estimate");
        let flat = HistogramEstimator::flatten_embedding(&estimate);
        assert_eq!(flat.len(), 9);
        assert_eq!(flat[1], estimate[(0, 1)]);
        assert_eq!(flat[3], estimate[(1, 0)]);
    }
}
