//! Shared test helpers for texmerge integration tests.
//!
//! All tests use temp directories — no side effects on the real tree.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Create a temp directory holding the given `(relative path, content)` files.
pub fn setup_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    dir
}

/// Write a file, creating parent directories.
pub fn write(root: &Path, rel_path: &str, content: &str) {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
}

/// Read a file. Returns None if it doesn't exist.
pub fn read(root: &Path, rel_path: &str) -> Option<String> {
    std::fs::read_to_string(root.join(rel_path)).ok()
}

/// Run texmerge with the given args in the given directory.
pub fn texmerge_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_texmerge"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("TEXMERGE_CONFIG")
        .env_remove("TEXMERGE_LOG_FORMAT")
        .output()
        .expect("failed to execute texmerge")
}

/// Run texmerge and assert it succeeds. Returns stdout as string.
pub fn texmerge_ok(dir: &Path, args: &[&str]) -> String {
    let out = texmerge_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "texmerge {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run texmerge and assert it fails. Returns stderr as string.
pub fn texmerge_fails(dir: &Path, args: &[&str]) -> String {
    let out = texmerge_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected texmerge {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
