pub mod permission;
pub mod poller;

pub use permission::*;
pub use poller::*;
