pub mod api;
pub mod error;
pub mod keys;
pub mod layouts;
pub mod module;
pub mod parameters;
pub mod scheme;
pub mod stats;

pub use api::*;
pub use error::*;
pub use keys::*;
pub use layouts::*;
pub use module::*;
pub use parameters::*;
pub use scheme::*;
pub use stats::*;
