//! Remote sources pinned to a branch or tag and kept as shallow checkouts
//!
//! A reference such as `https://example.com/repo.git#main` is checked out
//! once below the sources directory and moved forward on `update` when the
//! remote ref has advanced.

pub mod locks;
pub mod paths;
pub mod reference;
pub mod sync;

pub use locks::KeyedLocks;
pub use paths::checkout_path;
pub use reference::SourceReference;
pub use sync::{RemoteSourceSync, SyncOutcome};
