//! Shared utilities for stamp
//!
//! Small helpers used by more than one crate of the workspace: atomic file
//! writes for the file-backed result store, advisory path locks guarding
//! remote-source checkouts, XDG directory lookup and tracing setup.

pub mod atomic_file;
pub mod path_lock;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use path_lock::*;
pub use xdg::*;
