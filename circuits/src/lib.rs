pub mod adder;
pub mod bits;
pub mod boolean;
pub mod comparator;
pub mod error;
pub mod mvp;
pub mod session;

pub use bits::*;
pub use boolean::*;
pub use error::*;
pub use session::*;
