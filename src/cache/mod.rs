//! Generic in-memory cache for already-decoded values.
//!
//! This module provides a process-lifetime key/value store that:
//! - Holds at most one entry per key (insert overwrites)
//! - Never evicts on its own (no TTL, no size bound)
//! - Memoizes async fetches, keeping the first successful value
//! - Can be wiped wholesale when the session ends

mod session;
mod store;

pub use session::{invalidate_on_logout, SessionEvent};
pub use store::Cache;
