use anyhow::{ensure, Result};
use log::{info, warn};

use crate::augment::mixup::{MixupAugmenter, MixupConfig};
use crate::dataset::Dataset;
use crate::graph::Graph;
use crate::sampling::random_seed;

/// Knobs for dataset balancing. `extra_per_class` adds that many synthetic
/// graphs to every class on top of equalizing per-class counts.
#[derive(Debug, Clone)]
pub struct AugmentConfig {
    pub extra_per_class: Option<usize>,
    pub min_size: usize,
    pub max_attempts: usize,
    pub seed: Option<u64>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            extra_per_class: None,
            min_size: 30,
            max_attempts: 10_000,
            seed: None,
        }
    }
}

/// Orchestrates mixup across class labels to equalize per-class graph
/// counts.
pub struct DatasetBalancer;

impl DatasetBalancer {
    /// Return a copy of `dataset` extended with synthetic graphs.
    ///
    /// Every class is raised to the size of the largest class via mixup on
    /// its own members, then `extra_per_class` more graphs are appended per
    /// class when configured. Original pairs are never touched; a class
    /// whose augmentation fails is logged and skipped without disturbing
    /// the others.
    pub fn augment_dataset(dataset: &Dataset, config: &AugmentConfig) -> Result<Dataset> {
        ensure!(!dataset.is_empty(), "cannot augment an empty dataset");

        let counts = dataset.class_counts();
        let target = counts.values().copied().max().unwrap_or(0);
        let base_seed = config.seed.unwrap_or_else(random_seed);
        info!(
            "balancing {} classes toward {} graphs each",
            counts.len(),
            target
        );

        let mut augmented = dataset.clone();
        for (offset, (&label, &count)) in counts.iter().enumerate() {
            let deficit = target - count;
            if deficit == 0 {
                continue;
            }
            let stream = base_seed.wrapping_add(offset as u64 + 1);
            match Self::synthesize(dataset, label, deficit, stream, config) {
                Ok(graphs) => {
                    info!(
                        "class {}: appended {} of {} missing graphs",
                        label,
                        graphs.len(),
                        deficit
                    );
                    for graph in graphs {
                        augmented.push(graph, label);
                    }
                }
                Err(err) => warn!("class {}: balancing skipped: {:#}", label, err),
            }
        }

        if let Some(extra) = config.extra_per_class {
            for (offset, &label) in counts.keys().enumerate() {
                let stream = base_seed
                    .wrapping_add(0x5eed)
                    .wrapping_add(offset as u64 + 1);
                match Self::synthesize(dataset, label, extra, stream, config) {
                    Ok(graphs) => {
                        for graph in graphs {
                            augmented.push(graph, label);
                        }
                    }
                    Err(err) => warn!("class {}: extra round skipped: {:#}", label, err),
                }
            }
        }

        info!(
            "augmentation grew dataset from {} to {} graphs",
            dataset.len(),
            augmented.len()
        );
        Ok(augmented)
    }

    fn synthesize(
        dataset: &Dataset,
        label: i64,
        num_samples: usize,
        seed: u64,
        config: &AugmentConfig,
    ) -> Result<Vec<Graph>> {
        let members = dataset.class_graphs(label);
        let mixup_config = MixupConfig {
            min_size: config.min_size,
            max_attempts: config.max_attempts,
            seed: Some(seed),
        };
        MixupAugmenter::graphon_mixup(&members, num_samples, &mixup_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn complete_graph(n: usize) -> Graph {
        let mut adjacency = DMatrix::from_element(n, n, 1.0);
        for i in 0..n {
            adjacency[(i, i)] = 0.0;
        }
        Graph::from_adjacency(adjacency).expect("complete graph")
    }

    fn unbalanced_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.push(complete_graph(8), 0);
        dataset.push(complete_graph(9), 0);
        dataset.push(complete_graph(10), 0);
        dataset.push(complete_graph(10), 1);
        dataset
    }

    fn small_config(seed: u64) -> AugmentConfig {
        AugmentConfig {
            extra_per_class: None,
            min_size: 3,
            max_attempts: 200,
            seed: Some(seed),
        }
    }

    #[test]
    fn deficit_classes_are_raised_to_target() {
        let dataset = unbalanced_dataset();
        let augmented =
            DatasetBalancer::augment_dataset(&dataset, &small_config(5)).expect("augment");
        assert_eq!(augmented.len(), 6);
        let counts = augmented.class_counts();
        assert_eq!(counts[&0], 3);
        assert_eq!(counts[&1], 3);
    }

    #[test]
    fn originals_survive_as_a_prefix() {
        let dataset = unbalanced_dataset();
        let augmented =
            DatasetBalancer::augment_dataset(&dataset, &small_config(5)).expect("augment");
        assert_eq!(&augmented.graphs()[..dataset.len()], dataset.graphs());
        assert_eq!(&augmented.labels()[..dataset.len()], dataset.labels());
        assert_eq!(augmented.graphs().len(), augmented.labels().len());
    }

    #[test]
    fn extra_round_covers_every_class() {
        let dataset = unbalanced_dataset();
        let mut config = small_config(5);
        config.extra_per_class = Some(2);
        let augmented = DatasetBalancer::augment_dataset(&dataset, &config).expect("augment");
        // 4 originals + 2 balancing + 2 extra per class
        assert_eq!(augmented.len(), 10);
        let counts = augmented.class_counts();
        assert_eq!(counts[&0], 5);
        assert_eq!(counts[&1], 5);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(DatasetBalancer::augment_dataset(&Dataset::new(), &small_config(1)).is_err());
    }
}
