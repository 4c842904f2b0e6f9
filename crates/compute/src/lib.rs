pub mod analysis;
pub mod evaluator;

pub use evaluator::*;
