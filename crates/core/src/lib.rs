//! Core domain types, errors, and constants for `stamp`.
//!
//! Every other crate in the workspace builds on the vocabulary defined here:
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by the tree
//!   resolver, the remote-source synchronizer and the result cache.
//! - **`types`**: `FileEntry` / `TreeVersion` fingerprints, pinned remote
//!   source references and cached task results.
//! - **`constants`**: default file and directory names.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
