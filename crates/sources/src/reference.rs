//! Parsing of `<repository-url>#<ref-name>` references

use stamp_core::constants::REMOTE_REF_SEPARATOR;
use stamp_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A repository URL together with the branch or tag it is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceReference {
    pub url: String,
    pub ref_name: String,
}

impl SourceReference {
    /// Parse `"<url>#<ref>"`, splitting on the last `#`
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let Some((url, ref_name)) = reference.rsplit_once(REMOTE_REF_SEPARATOR) else {
            return Err(Error::configuration(format!(
                "remote source '{reference}' must name a ref as <url>#<ref>"
            )));
        };
        if url.is_empty() {
            return Err(Error::configuration(format!(
                "remote source '{reference}' has an empty repository URL"
            )));
        }
        if ref_name.is_empty() {
            return Err(Error::configuration(format!(
                "remote source '{reference}' has an empty ref name"
            )));
        }
        Ok(Self {
            url: url.to_string(),
            ref_name: ref_name.to_string(),
        })
    }
}

impl FromStr for SourceReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.url, REMOTE_REF_SEPARATOR, self.ref_name)
    }
}
