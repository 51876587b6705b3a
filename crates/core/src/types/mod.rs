//! Core domain types for `stamp`.
//!
//! - **`files`**: per-file content hashes and the aggregated tree version
//! - **`sources`**: pinned remote source references and their lifecycle state
//! - **`tasks`**: task scopes and the results cached against a version

pub mod files;
pub mod sources;
pub mod tasks;

pub use files::*;
pub use sources::*;
pub use tasks::*;
