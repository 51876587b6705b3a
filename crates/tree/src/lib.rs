//! Content versions of working trees.
//!
//! [`VersionResolver`] asks the [`WorkingTreeScanner`] which files exist,
//! narrows them with a [`GlobFilter`] and the project's ignore rules, and
//! reuses index hashes for unmodified files. Everything else is hashed by the
//! [`ContentHasher`] in the VCS blob format, so both kinds of hash agree.

pub mod filter;
pub mod hashing;
pub mod resolver;
pub mod scanner;

pub use filter::GlobFilter;
pub use hashing::ContentHasher;
pub use resolver::VersionResolver;
pub use scanner::{Candidate, WorkingTreeScanner};
