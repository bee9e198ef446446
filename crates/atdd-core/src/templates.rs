use crate::error::{AtddError, Result};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "prompts/"]
struct PromptAssets;

pub const SCENARIO_GENERATOR: &str = "atdd-scenario-generator-prompt.md";
pub const TEST_ROUTING: &str = "atdd-test-routing-prompt.md";
pub const UI_TEST_IMPLEMENTATION: &str = "ui-test-implementation-prompt.md";
pub const BUSINESS_LOGIC_TEST: &str = "business-logic-test-prompt.md";
pub const CODING_CONVENTIONS: &str = "test-coding-conventions.md";
pub const FEEDBACK_ANALYZER: &str = "feedback-analyzer-prompt.md";
pub const CONVENTION_SCANNER: &str = "project-convention-scanner.md";

/// Read a bundled prompt template by file name.
pub fn read_template(name: &str) -> Result<String> {
    let file = <PromptAssets as Embed>::get(name)
        .ok_or_else(|| AtddError::TemplateNotFound(name.to_string()))?;
    Ok(String::from_utf8_lossy(&file.data).into_owned())
}
