use crate::cmd::{self, Delivery};
use crate::output;
use anyhow::Context;
use atdd_core::learn::{self, LearnOutcome};
use atdd_core::runner::TestRunner;
use atdd_core::{paths, scanner::ScanTarget};
use std::path::Path;

pub fn run(root: &Path, source: Option<&Path>, delivery: Delivery) -> anyhow::Result<()> {
    let Some(selected) = cmd::select_source(root, source, ScanTarget::Learn)? else {
        return Ok(());
    };
    output::info(format!("Running tests for {}", selected.source.typed));

    let runner = TestRunner::new();
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let outcome = runtime.block_on(learn::learn(root, &selected.source.path, &runner))?;

    match outcome {
        LearnOutcome::Passed { test_file, .. } => {
            output::success(format!(
                "tests passed: {}",
                paths::relative_to(root, &test_file).display()
            ));
            output::hint("nothing to learn from this run");
        }
        LearnOutcome::Failed {
            test_file,
            run,
            prompt,
        } => {
            output::warn(format!(
                "tests failed: {}",
                paths::relative_to(root, &test_file).display()
            ));
            output::hint(format!("command: {}", run.command));
            delivery.deliver(&prompt, "Failure analysis")?;
            output::tip(format!(
                "paste it into your agent and merge the new rules into {}",
                paths::LESSONS_FILE
            ));
        }
    }
    Ok(())
}
