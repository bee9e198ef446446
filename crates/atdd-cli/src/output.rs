//! Console messages. Everything here goes to stderr so that `--print`
//! leaves stdout holding nothing but the prompt.

use atdd_core::types::TestType;
use atdd_core::AtddError;
use colored::Colorize;
use std::path::Path;

pub fn info(msg: impl AsRef<str>) {
    eprintln!("{}", msg.as_ref().blue());
}

pub fn success(msg: impl AsRef<str>) {
    eprintln!("{} {}", "✓".green(), msg.as_ref().green());
}

pub fn warn(msg: impl AsRef<str>) {
    eprintln!("{} {}", "!".yellow(), msg.as_ref().yellow());
}

pub fn hint(msg: impl AsRef<str>) {
    eprintln!("  {}", msg.as_ref().dimmed());
}

pub fn tip(msg: impl AsRef<str>) {
    eprintln!("{} {}", "→".cyan(), msg.as_ref().cyan());
}

/// Print the full error chain, then remediation for the kinds that have one.
pub fn report_error(e: &anyhow::Error) {
    eprintln!("{} {e:#}", "error:".red().bold());
    if let Some(kind) = e.chain().find_map(|c| c.downcast_ref::<AtddError>()) {
        for line in remediation(kind) {
            hint(line);
        }
    }
}

pub fn remediation(e: &AtddError) -> Vec<String> {
    match e {
        AtddError::ManifestMissing => {
            vec!["run `atdd-prompt init` first to generate the project manifest".to_string()]
        }
        AtddError::ScenarioArtifactMissing {
            source_path,
            candidates,
        } => artifact_hint("atdd", source_path, candidates),
        AtddError::PlanArtifactMissing {
            source_path,
            candidates,
        } => artifact_hint("plan", source_path, candidates),
        AtddError::TestFileMissing { candidates, .. } => {
            let mut lines = vec!["expected a test file at one of:".to_string()];
            lines.extend(candidates.iter().map(|c| format!("  {}", c.display())));
            lines.push("write the test first with `atdd-prompt gen <source>`".to_string());
            lines
        }
        AtddError::InvalidTestType(_) => {
            let valid: Vec<&str> = TestType::all().iter().map(|t| t.as_str()).collect();
            vec![format!("valid types: {}", valid.join(", "))]
        }
        AtddError::NoClipboardTool => {
            vec!["re-run with --print to write the prompt to stdout".to_string()]
        }
        _ => Vec::new(),
    }
}

fn artifact_hint(step: &str, source: &Path, candidates: &[std::path::PathBuf]) -> Vec<String> {
    let mut lines = vec![format!(
        "run `atdd-prompt {step} {}` first",
        source.display()
    )];
    if let Some(dir) = source.parent() {
        lines.push(format!("searched from: {}", dir.display()));
    }
    lines.push("expected one of:".to_string());
    lines.extend(candidates.iter().map(|c| format!("  {}", c.display())));
    lines
}
