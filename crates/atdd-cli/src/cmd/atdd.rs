use crate::cmd::{self, Delivery};
use crate::output;
use atdd_core::{prompt, scanner::ScanTarget};
use std::path::Path;

pub fn run(root: &Path, source: Option<&Path>, delivery: Delivery) -> anyhow::Result<()> {
    let Some(selected) = cmd::select_source(root, source, ScanTarget::Atdd)? else {
        return Ok(());
    };
    output::info(format!("Building ATDD scenario prompt for {}", selected.source.typed));

    let prompt = prompt::build_scenario_prompt(root, selected.source.clone())?;
    delivery.deliver(&prompt, "ATDD scenario")?;
    output::tip(format!(
        "save the scenario next to the source, then run `atdd-prompt plan {}`",
        selected.source.typed
    ));
    Ok(())
}
