use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const MANIFEST_FILE: &str = "project-manifest.yaml";
pub const LESSONS_FILE: &str = "project-test-lessons.md";

/// Test file extensions, in lookup priority order.
pub const TEST_FILE_EXTENSIONS: [&str; 4] = [".test.tsx", ".test.ts", ".spec.tsx", ".spec.ts"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

pub fn lessons_path(root: &Path) -> PathBuf {
    root.join(LESSONS_FILE)
}

/// A source file as the user named it, plus the path it is read from.
///
/// `path` is absolute, or relative to the project root for files that came
/// from a project scan. `typed` is what ends up in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub path: PathBuf,
    pub typed: String,
}

impl SourceRef {
    /// A path typed on the command line, resolved against the working
    /// directory it was typed in.
    pub fn from_cwd(cwd: &Path, typed: &Path) -> Self {
        Self {
            path: resolve_user_path(cwd, typed),
            typed: typed.display().to_string(),
        }
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            typed: path.display().to_string(),
        }
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        let typed = path.display().to_string();
        Self { path, typed }
    }
}

/// Resolve a user-supplied path against `base` into a single absolute path.
///
/// Purely lexical: `.` and `..` are folded without touching the filesystem,
/// so the source file does not need to exist.
pub fn resolve_user_path(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    normalize(&joined)
}

/// Fold `.` and `..` segments lexically.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `base`, emitting `..` segments when `path`
/// lives outside `base`.
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    let base = normalize(base);
    let path = normalize(path);
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();

    let common = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
