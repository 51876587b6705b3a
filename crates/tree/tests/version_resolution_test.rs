mod common;

use common::GitRepo;
use stamp_config::Settings;
use stamp_tree::{ContentHasher, GlobFilter, VersionResolver};
use std::path::PathBuf;
use tempfile::TempDir;

fn resolver() -> VersionResolver {
    VersionResolver::git(&Settings::default())
}

fn paths(version: &stamp_core::TreeVersion) -> Vec<PathBuf> {
    version.files().iter().map(|f| f.path.clone()).collect()
}

#[tokio::test]
async fn test_identical_tree_resolves_identically() {
    let repo = GitRepo::init();
    repo.write("src/main.go", "package main\n");
    repo.write("README.md", "# readme\n");
    repo.commit_all("init");
    repo.write("notes.txt", "untracked\n");

    let first = resolver().get_version(repo.path(), None).await.unwrap();
    let second = resolver().get_version(repo.path(), None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.version_string(), second.version_string());
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn test_index_hash_equals_blob_hash() {
    let repo = GitRepo::init();
    repo.write("lib.rs", "pub fn answer() -> u32 { 42 }\n");
    repo.commit_all("init");

    let version = resolver().get_version(repo.path(), None).await.unwrap();
    let recorded = version.hash_of(&repo.abs("lib.rs")).unwrap();

    let computed = ContentHasher::new()
        .hash_file(&repo.path().join("lib.rs"))
        .await
        .unwrap();
    assert_eq!(recorded, computed);
    assert_eq!(recorded, repo.git(&["rev-parse", "HEAD:lib.rs"]));
}

#[tokio::test]
async fn test_deleted_tracked_file_disappears() {
    let repo = GitRepo::init();
    repo.write("keep.txt", "keep\n");
    repo.write("gone.txt", "gone\n");
    repo.commit_all("init");

    let before = resolver().get_version(repo.path(), None).await.unwrap();
    repo.remove("gone.txt");
    let after = resolver().get_version(repo.path(), None).await.unwrap();

    assert!(before.hash_of(&repo.abs("gone.txt")).is_some());
    assert_eq!(paths(&after), vec![repo.abs("keep.txt")]);
    assert!(after.files().iter().all(|f| !f.hash.is_empty()));
    assert_ne!(before.aggregate_hash(), after.aggregate_hash());
}

#[tokio::test]
async fn test_include_filter_keeps_only_matching_files() {
    let repo = GitRepo::init();
    repo.write("main.go", "package main\n");
    repo.write("README.md", "docs\n");
    repo.commit_all("init");

    let include = vec!["**/*.go".to_string()];
    let version = resolver()
        .get_version(repo.path(), Some(&include))
        .await
        .unwrap();

    assert_eq!(paths(&version), vec![repo.abs("main.go")]);
}

#[tokio::test]
async fn test_ignore_rule_wins_over_include() {
    let repo = GitRepo::init();
    repo.write("app.go", "package app\n");
    repo.write("app_gen.go", "package app // generated\n");
    repo.write(".stampignore", "*_gen.go\n");
    repo.commit_all("init");
    repo.write("scratch_gen.go", "package scratch\n");

    let include = vec!["**/*.go".to_string()];
    let version = resolver()
        .get_version(repo.path(), Some(&include))
        .await
        .unwrap();

    assert_eq!(paths(&version), vec![repo.abs("app.go")]);
}

#[tokio::test]
async fn test_modified_file_is_rehashed() {
    let repo = GitRepo::init();
    repo.write("config.toml", "a = 1\n");
    repo.commit_all("init");

    let before = resolver().get_version(repo.path(), None).await.unwrap();
    repo.write("config.toml", "a = 2\n");
    let after = resolver().get_version(repo.path(), None).await.unwrap();

    assert_eq!(
        after.hash_of(&repo.abs("config.toml")),
        Some(ContentHasher::hash_bytes(b"a = 2\n").as_str())
    );
    assert_ne!(before.version_string(), after.version_string());
}

#[tokio::test]
async fn test_untracked_files_are_hashed() {
    let repo = GitRepo::init();
    repo.write("committed.txt", "one\n");
    repo.commit_all("init");
    repo.write("fresh.txt", "two\n");

    let version = resolver().get_version(repo.path(), None).await.unwrap();

    assert_eq!(
        version.hash_of(&repo.abs("fresh.txt")),
        Some(ContentHasher::hash_bytes(b"two\n").as_str())
    );
}

#[tokio::test]
async fn test_repository_without_commits() {
    let repo = GitRepo::init();
    repo.write("a.txt", "a\n");
    repo.git(&["add", "a.txt"]);
    repo.write("b.txt", "b\n");

    let version = resolver().get_version(repo.path(), None).await.unwrap();

    assert_eq!(paths(&version), vec![repo.abs("a.txt"), repo.abs("b.txt")]);
}

#[tokio::test]
async fn test_plain_directory_resolves_to_empty_version() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("file.txt"), "x").unwrap();

    let version = resolver().get_version(dir.path(), None).await.unwrap();

    assert!(version.is_empty());
}

#[tokio::test]
async fn test_subdirectory_root_sees_its_own_files() {
    let repo = GitRepo::init();
    repo.write("services/api/handler.go", "package api\n");
    repo.write("services/web/index.js", "console.log(1)\n");
    repo.commit_all("init");
    repo.write("services/api/handler.go", "package api // edited\n");

    let version = resolver()
        .get_version(&repo.path().join("services/api"), None)
        .await
        .unwrap();

    assert_eq!(paths(&version), vec![repo.abs("services/api/handler.go")]);
    assert_eq!(
        version.files()[0].hash,
        ContentHasher::hash_bytes(b"package api // edited\n")
    );
}

#[tokio::test]
async fn test_internal_dir_and_gitignored_files_are_skipped() {
    let repo = GitRepo::init();
    repo.write(".gitignore", "target/\n");
    repo.write("src/lib.rs", "\n");
    repo.commit_all("init");
    repo.write("target/debug/out", "binary");
    repo.write(".stamp/sources/x", "state");

    let version = resolver().get_version(repo.path(), None).await.unwrap();

    assert_eq!(
        paths(&version),
        vec![repo.abs(".gitignore"), repo.abs("src/lib.rs")]
    );
}

#[tokio::test]
async fn test_exclude_patterns() {
    let repo = GitRepo::init();
    repo.write("src/lib.rs", "\n");
    repo.write("src/generated/api.rs", "\n");
    repo.commit_all("init");

    let filter = GlobFilter::new(
        Some(&["src/**".to_string()]),
        &["src/generated/**".to_string()],
    )
    .unwrap();
    let version = resolver()
        .get_version_with_filter(repo.path(), &filter)
        .await
        .unwrap();

    assert_eq!(paths(&version), vec![repo.abs("src/lib.rs")]);
}

#[tokio::test]
async fn test_version_independent_of_concurrency() {
    let repo = GitRepo::init();
    for i in 0..20 {
        repo.write(&format!("file{i}.txt"), &format!("content {i}\n"));
    }

    let serial = VersionResolver::git(&Settings {
        hash_concurrency: 1,
        ..Settings::default()
    });
    let parallel = VersionResolver::git(&Settings {
        hash_concurrency: 16,
        ..Settings::default()
    });

    let a = serial.get_version(repo.path(), None).await.unwrap();
    let b = parallel.get_version(repo.path(), None).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = resolver()
        .get_version(&dir.path().join("nope"), None)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}
