pub mod distributions;
pub mod source;

pub use distributions::{DistributionError, NoiseDistribution};
pub use source::{Source, new_seed};
