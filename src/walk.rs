//! Source discovery: walk the project tree and read matching files.

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What to pick up during the walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
    pub include_tests: bool,
    /// Glob patterns matched against paths relative to the root.
    pub exclude: Vec<Pattern>,
}

impl WalkOptions {
    /// Compile `exclude` globs, dropping (and logging) invalid ones.
    pub fn new(extensions: &[String], include_tests: bool, exclude: &[String]) -> Self {
        let exclude = exclude
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();
        WalkOptions {
            extensions: extensions.to_vec(),
            include_tests,
            exclude,
        }
    }

    fn wants(&self, root: &Path, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !self.extensions.iter().any(|e| e == ext) {
            return false;
        }
        if !self.include_tests && is_test_file(path, ext) {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// A discovered file: its path and text, or the read error.
pub type SourceFile = (PathBuf, std::io::Result<String>);

/// List matching files under `root`, sorted for a deterministic fold order.
pub fn discover(root: &Path, options: &WalkOptions) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && options.wants(root, path) {
            debug!(path = %path.display(), "discovered source file");
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

/// Discover and read files, in walk order.
pub fn sources(root: &Path, options: &WalkOptions) -> impl Iterator<Item = SourceFile> {
    discover(root, options).into_iter().map(|path| {
        let text = fs::read_to_string(&path);
        (path, text)
    })
}

fn is_test_file(path: &Path, ext: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&format!("_test.{}", ext)))
}

/// Hidden, vendored and build-output directories are never scanned.
fn is_ignored(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || matches!(&*name, "vendor" | "node_modules" | "target")
}
