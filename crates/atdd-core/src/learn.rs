//! Run a source file's test and, when it fails, turn the failure into a
//! lessons-learned prompt.

use crate::config::{self, TestPathConfig};
use crate::error::{AtddError, Result};
use crate::runner::{TestRunOutcome, TestRunner};
use crate::{io, locator, paths, prompt};
use std::path::{Path, PathBuf};

/// Shown in the prompt when `project-test-lessons.md` does not exist.
pub const NO_LESSONS: &str = "(none)";

#[derive(Debug)]
pub enum LearnOutcome {
    Passed {
        test_file: PathBuf,
        run: TestRunOutcome,
    },
    Failed {
        test_file: PathBuf,
        run: TestRunOutcome,
        prompt: String,
    },
}

/// The test file for `source`, or `TestFileMissing` listing every
/// location tried.
pub fn require_test_file(root: &Path, source: &Path, config: &TestPathConfig) -> Result<PathBuf> {
    if let Some(found) = locator::find_test_file(root, source, config) {
        return Ok(found);
    }
    let absolute = paths::resolve_user_path(root, source);
    let candidates = locator::test_file_candidates(&absolute, config);
    Err(AtddError::TestFileMissing {
        source_path: absolute,
        candidates,
    })
}

/// Stderr when the run wrote any, stdout otherwise.
pub fn error_log(run: &TestRunOutcome) -> &str {
    if run.stderr.trim().is_empty() {
        &run.stdout
    } else {
        &run.stderr
    }
}

pub fn failure_prompt(root: &Path, test_file: &Path, run: &TestRunOutcome) -> Result<String> {
    let failed_code = io::read_user_file(test_file)?;
    let lessons_path = paths::lessons_path(root);
    let lessons = if lessons_path.exists() {
        Some(io::read_user_file(&lessons_path)?)
    } else {
        None
    };
    prompt::build_learn_prompt(
        &failed_code,
        error_log(run),
        lessons.as_deref().unwrap_or(NO_LESSONS),
    )
}

pub async fn learn(root: &Path, source: &Path, runner: &TestRunner) -> Result<LearnOutcome> {
    let config = TestPathConfig::load(root);
    let test_file = require_test_file(root, source, &config)?;
    let command = config::load_test_command(root);

    let run = runner.run(root, &test_file, &command).await;
    if run.interrupted {
        return Err(AtddError::Interrupted);
    }
    if run.success {
        return Ok(LearnOutcome::Passed { test_file, run });
    }
    let prompt = failure_prompt(root, &test_file, &run)?;
    Ok(LearnOutcome::Failed {
        test_file,
        run,
        prompt,
    })
}
