//! Parsers for the line-oriented output of git plumbing commands

use crate::backend::ListedFile;
use std::path::PathBuf;

/// Mode git uses for submodule entries
const GITLINK_MODE: &str = "160000";

/// Parse `ls-files -s --other` output.
///
/// Index entries look like `<mode> <hash> <stage>\t<path>`, untracked files
/// are a bare path. Submodules and untracked directory markers (`dir/`) are
/// dropped since they are not files.
pub fn parse_ls_files(output: &str) -> Vec<ListedFile> {
    let mut files = Vec::new();

    for line in output.lines().filter(|l| !l.is_empty()) {
        let (hash, raw_path) = match line.split_once('\t') {
            Some((meta, path)) => {
                let mut fields = meta.split(' ');
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(mode), Some(hash), Some(_stage)) => {
                        if mode == GITLINK_MODE {
                            tracing::trace!(path = %path, "skipping submodule entry");
                            continue;
                        }
                        (Some(hash.to_string()), path)
                    }
                    _ => (None, line),
                }
            }
            None => (None, line),
        };

        let path = unquote(raw_path);
        if path.ends_with('/') {
            continue;
        }
        files.push(ListedFile {
            path: PathBuf::from(path),
            hash,
        });
    }

    files
}

/// Parse one path per line, as printed by `ls-files` and `diff-index --name-only`
pub fn parse_path_list(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| PathBuf::from(unquote(l)))
        .collect()
}

/// Commit `ref_name` points at in a `ls-remote` or `show-ref --dereference` listing.
///
/// Only exact `refs/heads/<ref>` and `refs/tags/<ref>` names count, so a
/// `feature/main` branch never stands in for `main`. A branch wins over a
/// tag of the same name, as it does for `clone --branch`, and an annotated
/// tag resolves to its peeled `^{}` commit rather than the tag object.
pub fn ref_commit(output: &str, ref_name: &str) -> Option<String> {
    let branch = format!("refs/heads/{ref_name}");
    let tag = format!("refs/tags/{ref_name}");
    let peeled = format!("{tag}^{{}}");

    let listed: Vec<(&str, &str)> = output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some((fields.next()?, fields.next()?))
        })
        .collect();

    let found = [branch.as_str(), peeled.as_str(), tag.as_str()]
        .into_iter()
        .find_map(|wanted| listed.iter().find(|(_, name)| *name == wanted))
        .map(|(hash, _)| hash.to_string());
    found
}

/// Undo git's C-style quoting of unusual path names (`"a\tb"`, octal escapes for UTF-8)
pub fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.bytes().peekable();
    while let Some(b) = chars.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match chars.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&n @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(n - b'0');
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}
