use anyhow::{bail, ensure, Result};
use log::{debug, info};
use nalgebra::DMatrix;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::graph::Graph;
use crate::graphon::Graphon;

/// Randomness configuration for graph synthesis. Seeded runs are
/// reproducible; unseeded runs derive a seed from the thread RNG.
#[derive(Debug, Clone, Default)]
pub struct SampleConfig {
    pub seed: Option<u64>,
}

impl SampleConfig {
    pub fn seeded(seed: u64) -> SampleConfig {
        SampleConfig { seed: Some(seed) }
    }
}

/// How graph sizes are chosen during simulation.
#[derive(Debug, Clone, Copy)]
pub enum SizeSpec {
    /// Every graph gets exactly this many nodes.
    Fixed(usize),
    /// Sizes drawn without replacement from `floor + 1..limit`.
    Range { floor: usize, limit: usize },
}

pub struct GraphSampler;

impl GraphSampler {
    /// Sample one simple undirected graph per requested node count.
    ///
    /// Each graph draws its own i.i.d. U[0,1] node positions, evaluates the
    /// graphon into an edge-probability matrix, and Bernoulli-samples the
    /// strict upper triangle; the lower triangle mirrors it and the diagonal
    /// stays zero. Probabilities are clamped to [0,1] before use since some
    /// catalogue forms exceed the unit interval.
    pub fn generate_graphs(
        graphon: Graphon,
        node_counts: &[usize],
        config: &SampleConfig,
    ) -> Result<Vec<Graph>> {
        let base_seed = config.seed.unwrap_or_else(random_seed);
        node_counts
            .par_iter()
            .enumerate()
            .map(|(offset, &n)| {
                if n == 0 {
                    bail!("cannot sample a graph with zero nodes");
                }
                let mut rng =
                    Xoshiro256PlusPlus::seed_from_u64(base_seed.wrapping_add(offset as u64));
                let positions: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
                let probabilities = graphon.evaluate(&positions);
                Ok(sample_from_probabilities(&probabilities, &mut rng))
            })
            .collect()
    }

    /// Simulate a labeled dataset: `per_graphon` graphs for each catalogue
    /// entry, labeled by the graphon's position in `graphons`.
    pub fn data_simulation(
        graphons: &[Graphon],
        per_graphon: usize,
        sizes: SizeSpec,
        config: &SampleConfig,
    ) -> Result<Dataset> {
        ensure!(!graphons.is_empty(), "simulation requires at least one graphon");
        ensure!(per_graphon > 0, "per-graphon graph count must be positive");

        let base_seed = config.seed.unwrap_or_else(random_seed);
        let mut size_rng = Xoshiro256PlusPlus::seed_from_u64(base_seed);

        let mut dataset = Dataset::new();
        for (class, &graphon) in graphons.iter().enumerate() {
            let node_counts = draw_sizes(sizes, per_graphon, &mut size_rng)?;
            debug!("graphon {:?}: sampling sizes {:?}", graphon, node_counts);
            // distinct stream per class so adding a graphon never perturbs
            // the graphs of earlier classes
            let class_config = SampleConfig::seeded(
                base_seed.wrapping_add((class as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)),
            );
            let graphs = Self::generate_graphs(graphon, &node_counts, &class_config)?;
            for graph in graphs {
                dataset.push(graph, class as i64);
            }
        }
        info!(
            "simulated {} graphs across {} graphons",
            dataset.len(),
            graphons.len()
        );
        Ok(dataset)
    }
}

/// Bernoulli-sample a symmetric loopless graph from an edge-probability
/// matrix. Shared by the graphon sampler and mixup resampling.
pub(crate) fn sample_from_probabilities(
    probabilities: &DMatrix<f64>,
    rng: &mut Xoshiro256PlusPlus,
) -> Graph {
    let n = probabilities.nrows();
    let mut adjacency = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let p = probabilities[(i, j)].clamp(0.0, 1.0);
            if rng.gen::<f64>() < p {
                adjacency[(i, j)] = 1.0;
                adjacency[(j, i)] = 1.0;
            }
        }
    }
    Graph::from_adjacency_unchecked(adjacency)
}

fn draw_sizes(
    sizes: SizeSpec,
    count: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Vec<usize>> {
    match sizes {
        SizeSpec::Fixed(n) => {
            ensure!(n > 0, "fixed graph size must be positive");
            Ok(vec![n; count])
        }
        SizeSpec::Range { floor, limit } => {
            ensure!(
                floor + 1 < limit,
                "size range floor {} leaves no sizes below limit {}",
                floor,
                limit
            );
            let mut candidates: Vec<usize> = (floor + 1..limit).collect();
            ensure!(
                candidates.len() >= count,
                "size range ({}, {}) cannot supply {} distinct graph sizes",
                floor,
                limit,
                count
            );
            candidates.shuffle(rng);
            candidates.truncate(count);
            Ok(candidates)
        }
    }
}

pub(crate) fn random_seed() -> u64 {
    rand::thread_rng().gen()
}
