pub mod atdd;
pub mod gen;
pub mod init;
pub mod learn;
pub mod plan;

use crate::{clipboard, output, picker};
use anyhow::Context;
use atdd_core::paths::SourceRef;
use atdd_core::scanner::ScanTarget;
use std::io::Write;
use std::path::Path;

/// Where a finished prompt goes.
#[derive(Debug, Clone, Copy)]
pub struct Delivery {
    print: bool,
}

impl Delivery {
    pub fn new(print: bool) -> Self {
        Self { print }
    }

    pub fn deliver(self, prompt: &str, what: &str) -> anyhow::Result<()> {
        if self.print {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(prompt.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write prompt to stdout")?;
            output::success(format!("{what} prompt written to stdout"));
        } else {
            clipboard::copy_to_clipboard(prompt)
                .with_context(|| format!("failed to deliver {what} prompt"))?;
            output::success(format!(
                "{what} prompt copied to clipboard ({} chars)",
                prompt.chars().count()
            ));
        }
        Ok(())
    }
}

/// A source file named on the command line or chosen in the picker.
pub struct Selected {
    pub source: SourceRef,
    pub picked: bool,
}

/// `None` when the picker was cancelled.
///
/// A path from the command line is taken relative to the working directory;
/// a picked path is relative to the project root.
pub fn select_source(
    root: &Path,
    source: Option<&Path>,
    target: ScanTarget,
) -> anyhow::Result<Option<Selected>> {
    if let Some(path) = source {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        return Ok(Some(Selected {
            source: SourceRef::from_cwd(&cwd, path),
            picked: false,
        }));
    }
    match picker::pick(root, target)? {
        Some(path) => Ok(Some(Selected {
            source: SourceRef::from(path),
            picked: true,
        })),
        None => {
            output::info("cancelled");
            Ok(None)
        }
    }
}
