pub mod boundary;
pub mod track;

pub use boundary::*;
pub use track::*;
