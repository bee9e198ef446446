use crate::cmd::{self, Delivery};
use crate::output;
use atdd_core::{prompt, scanner::ScanTarget};
use std::path::Path;

pub fn run(root: &Path, source: Option<&Path>, delivery: Delivery) -> anyhow::Result<()> {
    let Some(selected) = cmd::select_source(root, source, ScanTarget::Plan)? else {
        return Ok(());
    };
    output::info(format!("Building test plan prompt for {}", selected.source.typed));

    let prompt = prompt::build_plan_prompt(root, selected.source.clone())?;
    delivery.deliver(&prompt, "Test plan")?;
    output::tip(format!(
        "save the plan, then run `atdd-prompt gen {}`",
        selected.source.typed
    ));
    Ok(())
}
