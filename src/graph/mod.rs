pub mod model;
pub mod serialization;

pub use model::Graph;
pub use serialization::{RawDataset, RawGraph};
