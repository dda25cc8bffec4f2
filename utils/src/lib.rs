pub mod map;
pub mod math;

pub use map::Map;
pub use math::{isqrt, log2_ceil};
