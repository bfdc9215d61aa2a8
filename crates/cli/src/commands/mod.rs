pub mod collect;
pub mod tools;

pub use collect::*;
pub use tools::*;
