pub mod config;
pub mod error;
pub mod session;
pub mod status;

pub use config::*;
pub use error::*;
pub use session::*;
pub use status::*;
