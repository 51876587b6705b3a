use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for stamp
pub struct XdgPaths;

impl XdgPaths {
    /// `$XDG_CACHE_HOME/stamp`, falling back to `~/.cache/stamp`
    pub fn cache_dir() -> PathBuf {
        Self::base("XDG_CACHE_HOME", ".cache").join("stamp")
    }

    fn base(var: &str, home_relative: &str) -> PathBuf {
        env::var_os(var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join(home_relative))
                    .unwrap_or_else(|| PathBuf::from(home_relative))
            })
    }
}
