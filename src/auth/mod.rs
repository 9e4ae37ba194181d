//! Authentication feature: endpoint wrappers, session state, and route
//! guards over the shared HTTP layer.

pub mod client;
pub mod guard;
pub mod session;
pub mod types;
