//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: drops expired entries from the in-memory store
//! - Reconnect: retries the cache connection while the store is down

mod cleanup;
mod reconnect;

pub use cleanup::spawn_cleanup_task;
pub use reconnect::spawn_reconnect_task;
