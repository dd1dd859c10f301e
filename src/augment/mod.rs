pub mod balance;
pub mod mixup;

pub use balance::{AugmentConfig, DatasetBalancer};
pub use mixup::{MixupAugmenter, MixupConfig};
