use anyhow::Context;
use atdd_core::config::TestPathConfig;
use atdd_core::scanner::{self, FileCandidate, ScanTarget};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const MAX_SHOWN: usize = 15;

/// Scan the project and let the user choose a source file on the terminal.
/// `Ok(None)` means the user cancelled.
pub fn pick(root: &Path, target: ScanTarget) -> anyhow::Result<Option<PathBuf>> {
    let config = TestPathConfig::load(root);
    let candidates = scanner::scan(root, target, &config);
    if candidates.is_empty() {
        anyhow::bail!("no candidate files found under {}", root.display());
    }
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stderr();
    pick_from(&candidates, &mut input, &mut out)
}

pub fn pick_from<R: BufRead, W: Write>(
    candidates: &[FileCandidate],
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Option<PathBuf>> {
    write!(out, "{} ", "Search (file name or route, empty for all):".bold())?;
    out.flush()?;
    let Some(keyword) = read_answer(input)? else {
        return Ok(None);
    };

    let matches = scanner::filter_candidates(candidates, &keyword);
    if matches.is_empty() {
        anyhow::bail!("no files match '{}'", keyword.trim());
    }

    let shown = &matches[..matches.len().min(MAX_SHOWN)];
    let mut group = "";
    for (i, candidate) in shown.iter().enumerate() {
        if candidate.group != group {
            group = candidate.group;
            writeln!(out, "{}", group.dimmed())?;
        }
        writeln!(out, "  {:>2}) {}", i + 1, candidate.title)?;
    }
    if matches.len() > shown.len() {
        writeln!(
            out,
            "{}",
            format!("  ... {} more, narrow the search", matches.len() - shown.len()).dimmed()
        )?;
    }

    write!(out, "{} ", format!("Select [1-{}] (empty to cancel):", shown.len()).bold())?;
    out.flush()?;
    let Some(answer) = read_answer(input)? else {
        return Ok(None);
    };
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }

    let index: usize = answer
        .parse()
        .with_context(|| format!("invalid selection '{answer}'"))?;
    match index.checked_sub(1).and_then(|i| shown.get(i)) {
        Some(candidate) => Ok(Some(candidate.path.clone())),
        None => anyhow::bail!("selection {index} is out of range 1-{}", shown.len()),
    }
}

/// One line of input; `None` on end of input.
fn read_answer<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("failed to read selection")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
