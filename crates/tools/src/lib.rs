pub mod check;
pub mod inputs;
pub mod replay;

pub use check::*;
pub use inputs::*;
pub use replay::*;
