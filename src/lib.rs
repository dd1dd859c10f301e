pub mod augment;
pub mod dataset;
pub mod estimator;
pub mod graph;
pub mod graphon;
pub mod sampling;

pub use augment::{AugmentConfig, DatasetBalancer, MixupAugmenter, MixupConfig};
pub use dataset::{dataset_file_name, Dataset};
pub use estimator::HistogramEstimator;
pub use graph::{Graph, RawDataset, RawGraph};
pub use graphon::Graphon;
pub use sampling::{GraphSampler, SampleConfig, SizeSpec};
