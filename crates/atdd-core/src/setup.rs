use crate::error::Result;
use crate::{io, paths};
use std::path::Path;

pub const DEFAULT_LESSONS: &str = "# Project Test Lessons & Rules

This file lists the project-specific rules an AI agent must follow when it
generates tests. It is updated from real test failures.

## 1. Critical Environment Rules
> Mocking rules required by differences between JSDOM, Node.js and the browser.

- (nothing recorded yet)

## 2. Library & Framework Specifics
> Quirks of the libraries in use (state stores, data fetching, MSW, ...).

- (nothing recorded yet)

## 3. Common Anti-Patterns
> Patterns that failed repeatedly in this project.

- (nothing recorded yet)
";

/// Create `project-test-lessons.md` with the default outline unless it
/// already exists. Returns true if the file was written.
pub fn ensure_lessons_file(root: &Path) -> Result<bool> {
    let path = paths::lessons_path(root);
    let written = io::write_if_missing(&path, DEFAULT_LESSONS.as_bytes())?;
    if written {
        tracing::debug!("created {}", path.display());
    }
    Ok(written)
}
