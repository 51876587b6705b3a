//! Deterministic checkout locations

use crate::reference::SourceReference;
use sha2::{Digest, Sha256};
use stamp_core::constants::SOURCE_KEY_HASH_LENGTH;
use stamp_core::{Error, Result, SourceKind};
use std::path::{Path, PathBuf};

/// `<sources_dir>/<kind>/<name>--<first 10 hex of sha256(url#ref)>`
///
/// The same (name, url, ref) always maps to the same directory, and a
/// change of url or ref moves the checkout somewhere new.
pub fn checkout_path(
    sources_dir: &Path,
    kind: SourceKind,
    name: &str,
    reference: &SourceReference,
) -> Result<PathBuf> {
    validate_name(name)?;
    let digest = hex::encode(Sha256::digest(reference.to_string().as_bytes()));
    Ok(sources_dir
        .join(kind.dir_name())
        .join(format!("{name}--{}", &digest[..SOURCE_KEY_HASH_LENGTH])))
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "remote source name '{name}' cannot be used as a directory name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> SourceReference {
        SourceReference::parse(s).unwrap()
    }

    #[test]
    fn test_path_layout() {
        let path = checkout_path(
            Path::new("/p/.stamp/sources"),
            SourceKind::Module,
            "tools",
            &reference("https://github.com/acme/tools.git#main"),
        )
        .unwrap();

        assert_eq!(path.parent().unwrap(), Path::new("/p/.stamp/sources/module"));
        let dir = path.file_name().unwrap().to_str().unwrap();
        let (name, hash) = dir.split_once("--").unwrap();
        assert_eq!(name, "tools");
        assert_eq!(hash.len(), 10);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_path_depends_on_url_and_ref() {
        let dir = Path::new("/s");
        let a = checkout_path(dir, SourceKind::Project, "x", &reference("u1#main")).unwrap();
        let b = checkout_path(dir, SourceKind::Project, "x", &reference("u1#main")).unwrap();
        let c = checkout_path(dir, SourceKind::Project, "x", &reference("u1#dev")).unwrap();
        let d = checkout_path(dir, SourceKind::Project, "x", &reference("u2#main")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_bad_names_rejected() {
        for name in ["", ".", "..", "a/b"] {
            let err = checkout_path(Path::new("/s"), SourceKind::Project, name, &reference("u#m"))
                .unwrap_err();
            assert!(err.is_configuration());
        }
    }
}
