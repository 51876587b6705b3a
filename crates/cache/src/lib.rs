//! Result cache for tasks whose inputs are pinned by a tree version
//!
//! A task result is stored under its scope and the version string of the
//! tree it ran against, so any content change produces a fresh key and
//! stale entries are never consulted.

pub mod keys;
pub mod results;
pub mod store;

pub use keys::result_key;
pub use results::{truncate_tail, CacheDecision, ExecuteReason, TaskResultCache};
pub use store::{FileStore, KeyValueStore, MemoryStore};
