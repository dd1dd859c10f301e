use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;

use crate::graph::{Graph, RawDataset, RawGraph};

/// Ordered list of (graph, label) pairs. Mutated only by append; existing
/// entries are never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    graphs: Vec<Graph>,
    labels: Vec<i64>,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }

    pub fn from_pairs(graphs: Vec<Graph>, labels: Vec<i64>) -> Result<Dataset> {
        ensure!(
            graphs.len() == labels.len(),
            "dataset requires one label per graph, got {} graphs and {} labels",
            graphs.len(),
            labels.len()
        );
        Ok(Dataset { graphs, labels })
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn push(&mut self, graph: Graph, label: i64) {
        self.graphs.push(graph);
        self.labels.push(label);
    }

    /// Per-class graph counts in first-seen label order, so balancing walks
    /// classes deterministically.
    pub fn class_counts(&self) -> IndexMap<i64, usize> {
        let mut counts = IndexMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// All graphs carrying the given label, in dataset order.
    pub fn class_graphs(&self, label: i64) -> Vec<&Graph> {
        self.graphs
            .iter()
            .zip(&self.labels)
            .filter(|(_, &l)| l == label)
            .map(|(graph, _)| graph)
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = RawDataset {
            graphs: self.graphs.iter().map(RawGraph::from_graph).collect(),
            labels: self.labels.clone(),
        };
        write_json(path, &raw).with_context(|| format!("save dataset to {:?}", path))
    }

    pub fn load(path: &Path) -> Result<Dataset> {
        let raw: RawDataset =
            read_json(path).with_context(|| format!("load dataset from {:?}", path))?;
        let graphs = raw
            .graphs
            .into_iter()
            .map(RawGraph::into_graph)
            .collect::<Result<Vec<_>>>()?;
        Dataset::from_pairs(graphs, raw.labels)
    }
}

/// File name for a simulated dataset artifact keyed by its generation
/// parameters.
pub fn dataset_file_name(num_graphons: usize, graphs_per_graphon: usize) -> String {
    format!("{}_graphons_{}_graphs.json", num_graphons, graphs_per_graphon)
}

fn read_json<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path).with_context(|| format!("open json file {:?}", path))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).with_context(|| format!("deserialize json file {:?}", path))
}

fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
    T: serde::Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("create json file {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, value)
        .with_context(|| format!("serialize json file {:?}", path))
}
