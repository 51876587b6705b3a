//! Settings for stamp
//!
//! Settings are layered: built-in defaults, then an optional `stamp.json` in
//! the project root, then `STAMP_*` environment variables. The loader records
//! which layers contributed so misconfiguration can be traced back.

pub mod loader;
pub mod settings;

pub use loader::*;
pub use settings::*;
