use crate::cmd::{self, Delivery};
use crate::output;
use atdd_core::{prompt, scanner::ScanTarget, types::TestType};
use std::path::Path;

pub fn run(
    root: &Path,
    source: Option<&Path>,
    test_type: Option<&str>,
    delivery: Delivery,
) -> anyhow::Result<()> {
    // An explicit --type is validated before any picking happens.
    let explicit = test_type.map(str::parse::<TestType>).transpose()?;

    let Some(selected) = cmd::select_source(root, source, ScanTarget::Gen)? else {
        return Ok(());
    };
    let test_type = match explicit {
        Some(t) => t,
        None if selected.picked => TestType::infer_from_path(&selected.source.path),
        None => TestType::default(),
    };
    output::info(format!(
        "Building {} test prompt for {}",
        test_type.label(),
        selected.source.typed
    ));

    let prompt = prompt::build_gen_prompt(root, selected.source.clone(), test_type)?;
    delivery.deliver(&prompt, &format!("{} test", test_type.label()))?;
    output::tip(format!(
        "save the test, then run `atdd-prompt learn {}` to check it",
        selected.source.typed
    ));
    Ok(())
}
