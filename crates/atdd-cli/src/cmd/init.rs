use crate::cmd::Delivery;
use crate::output;
use atdd_core::{paths, setup, templates};
use std::path::Path;

pub fn run(root: &Path, delivery: Delivery) -> anyhow::Result<()> {
    output::info(format!("Initializing ATDD prompts in: {}", root.display()));

    if setup::ensure_lessons_file(root)? {
        output::success(format!("created {}", paths::LESSONS_FILE));
    } else {
        output::hint(format!("exists:  {}", paths::LESSONS_FILE));
    }

    let prompt = templates::read_template(templates::CONVENTION_SCANNER)?;
    delivery.deliver(&prompt, "Convention scanner")?;
    output::tip(format!(
        "paste it into your agent and save the result as {}",
        paths::MANIFEST_FILE
    ));
    Ok(())
}
