//! Version-control backend for stamp.
//!
//! Resolution and synchronization code never shells out directly. They talk
//! to a [`VcsBackend`], whose only production implementation is
//! [`GitBackend`]. Numeric exit codes are translated here, at the boundary,
//! into the named outcomes of [`Scan`].

pub mod backend;
pub mod command;
pub mod git;
pub mod parse;

pub use backend::{ListedFile, Scan, VcsBackend};
pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use git::GitBackend;
