use anyhow::{ensure, Result};
use log::warn;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::estimator::HistogramEstimator;
use crate::graph::Graph;
use crate::sampling::{random_seed, sample_from_probabilities};

/// Knobs for mixup resampling.
///
/// `min_size` is the accept threshold on a candidate's post-pruning node
/// count; it is intentionally a separate parameter from any histogram
/// resolution used by embedding callers.
#[derive(Debug, Clone)]
pub struct MixupConfig {
    pub min_size: usize,
    pub max_attempts: usize,
    pub seed: Option<u64>,
}

impl Default for MixupConfig {
    fn default() -> Self {
        Self {
            min_size: 30,
            max_attempts: 10_000,
            seed: None,
        }
    }
}

/// Blends histogram estimates of same-class graphs into one averaged
/// graphon and resamples new graphs from it.
pub struct MixupAugmenter;

impl MixupAugmenter {
    /// Average the histogram estimates of `graphs` at the shared resolution
    /// `d = min(node counts)`, so every summary has the same shape.
    pub fn blend_histograms(graphs: &[&Graph]) -> Result<DMatrix<f64>> {
        ensure!(!graphs.is_empty(), "mixup requires at least one graph");
        let d = graphs
            .iter()
            .map(|graph| graph.node_count())
            .min()
            .unwrap_or(0);
        ensure!(d > 0, "mixup requires graphs with at least one node");

        let mut blended = DMatrix::zeros(d, d);
        for graph in graphs {
            let histogram = HistogramEstimator::hist_approximate(graph, d)?;
            ensure!(
                histogram.nrows() == d && histogram.ncols() == d,
                "histogram shape {}x{} does not match blend dimension {}",
                histogram.nrows(),
                histogram.ncols(),
                d
            );
            blended += histogram;
        }
        blended /= graphs.len() as f64;
        Ok(blended)
    }

    /// Sample up to `num_samples` new graphs from the blended graphon of
    /// `graphs`.
    ///
    /// Each candidate Bernoulli-samples the blended estimate, then drops
    /// zero-degree nodes; it is accepted only if more than
    /// `config.min_size` nodes survive. Draws are capped at
    /// `config.max_attempts`: when the blend cannot produce enough large
    /// candidates the shortfall is logged and the partial list returned
    /// rather than looping forever.
    pub fn graphon_mixup(
        graphs: &[&Graph],
        num_samples: usize,
        config: &MixupConfig,
    ) -> Result<Vec<Graph>> {
        ensure!(config.max_attempts > 0, "mixup attempt budget must be positive");
        let blended = Self::blend_histograms(graphs)?;
        let base_seed = config.seed.unwrap_or_else(random_seed);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(base_seed);

        let mut accepted = Vec::with_capacity(num_samples);
        let mut attempts = 0;
        while accepted.len() < num_samples && attempts < config.max_attempts {
            attempts += 1;
            let candidate = sample_from_probabilities(&blended, &mut rng);
            let pruned = prune_isolated(candidate);
            if pruned.node_count() > config.min_size {
                accepted.push(pruned);
            }
        }

        if accepted.len() < num_samples {
            warn!(
                "mixup accepted {} of {} requested graphs above {} nodes after {} attempts",
                accepted.len(),
                num_samples,
                config.min_size,
                attempts
            );
        }
        Ok(accepted)
    }
}

/// Drop every zero-degree node. Removing an isolated node deletes no edges,
/// so a single pass leaves no new isolates behind.
fn prune_isolated(graph: Graph) -> Graph {
    let adjacency = graph.adjacency();
    let keep: Vec<usize> = (0..graph.node_count())
        .filter(|&i| adjacency.row(i).sum() > 0.0)
        .collect();
    if keep.len() == graph.node_count() {
        return graph;
    }
    let pruned = DMatrix::from_fn(keep.len(), keep.len(), |i, j| {
        adjacency[(keep[i], keep[j])]
    });
    Graph::from_adjacency_unchecked(pruned)
}
