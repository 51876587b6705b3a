//! Include/exclude glob matching on root-relative paths

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use stamp_core::{Error, Result};
use std::path::Path;

/// Compiled include and exclude patterns.
///
/// Without include patterns every path matches. Exclude patterns always win.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl Default for GlobFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl GlobFilter {
    /// Filter that accepts every path
    pub fn all() -> Self {
        Self {
            include: None,
            exclude: None,
        }
    }

    pub fn new(include: Option<&[String]>, exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: include.map(build_set).transpose()?,
            exclude: if exclude.is_empty() {
                None
            } else {
                Some(build_set(exclude)?)
            },
        })
    }

    /// Filter with include patterns only
    pub fn include(patterns: &[String]) -> Result<Self> {
        Self::new(Some(patterns), &[])
    }

    /// Whether a root-relative path passes the filter
    pub fn matches(&self, relative: &Path) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(relative) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(relative),
            None => true,
        }
    }
}

/// One-shot form of [`GlobFilter::matches`]
pub fn matches(relative: &Path, include: Option<&[String]>) -> Result<bool> {
    Ok(GlobFilter::new(include, &[])?.matches(relative))
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::configuration(format!("invalid glob pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::configuration(format!("failed to build glob set: {e}")))
}
