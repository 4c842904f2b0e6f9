pub mod math;
pub mod sample;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use math::*;
pub use sample::*;
pub use time::*;
