//! Companion-artifact lookup.
//!
//! Given a source file, the scenario, plan and test files that belong to it
//! live next to it or inside the configured companion directory, named either
//! after the file itself (`page.atdd.md`) or after its directory
//! (`login.atdd.md`). Candidates are probed in a fixed order and the first
//! existing one wins.

use crate::config::TestPathConfig;
use crate::paths::{self, TEST_FILE_EXTENSIONS};
use std::path::{Path, PathBuf};

/// What a source file's name is made of, for building companion names.
struct SourceParts<'a> {
    dir: &'a Path,
    base: String,
    parent_name: String,
}

impl<'a> SourceParts<'a> {
    fn of(source: &'a Path) -> Self {
        let dir = source.parent().unwrap_or(Path::new("/"));
        let base = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent_name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            dir,
            base,
            parent_name,
        }
    }
}

/// The four candidates for `suffix`, highest priority first.
pub fn artifact_candidates(source: &Path, suffix: &str, config: &TestPathConfig) -> Vec<PathBuf> {
    let parts = SourceParts::of(source);
    let companion = parts.dir.join(&config.dir_name);
    vec![
        parts.dir.join(format!("{}{suffix}", parts.base)),
        parts.dir.join(format!("{}{suffix}", parts.parent_name)),
        companion.join(format!("{}{suffix}", parts.base)),
        companion.join(format!("{}{suffix}", parts.parent_name)),
    ]
}

/// The eight test-file candidates: every extension in the source directory,
/// then every extension in the companion directory.
pub fn test_file_candidates(source: &Path, config: &TestPathConfig) -> Vec<PathBuf> {
    let parts = SourceParts::of(source);
    let companion = parts.dir.join(&config.dir_name);
    [parts.dir.to_path_buf(), companion]
        .iter()
        .flat_map(|dir| {
            TEST_FILE_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}{ext}", parts.base)))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    for candidate in candidates {
        tracing::debug!("probing {}", candidate.display());
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Locate the artifact with `suffix` for `source` (resolved against `root`).
pub fn locate(
    root: &Path,
    source: impl AsRef<Path>,
    suffix: &str,
    config: &TestPathConfig,
) -> Option<PathBuf> {
    let source = paths::resolve_user_path(root, source);
    first_existing(artifact_candidates(&source, suffix, config))
}

pub fn find_atdd_file(
    root: &Path,
    source: impl AsRef<Path>,
    config: &TestPathConfig,
) -> Option<PathBuf> {
    locate(root, source, &config.atdd_suffix, config)
}

pub fn find_plan_file(
    root: &Path,
    source: impl AsRef<Path>,
    config: &TestPathConfig,
) -> Option<PathBuf> {
    locate(root, source, &config.plan_suffix, config)
}

pub fn find_test_file(
    root: &Path,
    source: impl AsRef<Path>,
    config: &TestPathConfig,
) -> Option<PathBuf> {
    let source = paths::resolve_user_path(root, source);
    first_existing(test_file_candidates(&source, config))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
