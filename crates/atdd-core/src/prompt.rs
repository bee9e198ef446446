//! Prompt assembly for the four workflows.
//!
//! Every generated prompt is a bundled template followed by an `Input Data`
//! block of labelled sections:
//!
//! ```text
//! [Label]
//! <<<
//! content
//! >>>
//! ```
//!
//! The agent on the other side parses labels and order by convention, so
//! both are fixed per workflow in [`Workflow::recipe`].

use crate::config::{Manifest, TestPathConfig};
use crate::error::{AtddError, Result};
use crate::types::TestType;
use crate::paths::SourceRef;
use crate::{io, locator, paths, templates};
use std::path::{Path, PathBuf};

pub const NO_LESSONS_PLACEHOLDER: &str = "(No lessons recorded yet)";

const INPUT_DATA_HEADER: &str = "\n\n---\n\n## Input Data\n\n";

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Scenario,
    Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Scenario,
    Plan,
    Generate(TestType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Artifact,
    Manifest,
    SourceCode,
    SourcePath,
    ExecutionGuide,
    Lessons,
}

#[derive(Debug, Clone, Copy)]
struct Section {
    label: &'static str,
    content: Content,
}

const fn section(label: &'static str, content: Content) -> Section {
    Section { label, content }
}

struct Recipe {
    template: &'static str,
    required: Option<ArtifactKind>,
    sections: &'static [Section],
}

const SCENARIO_SECTIONS: &[Section] = &[
    section("[Project Configuration]", Content::Manifest),
    section("[Code]", Content::SourceCode),
    section("[Feature Name or File Path] (Required)", Content::SourcePath),
];

const PLAN_SECTIONS: &[Section] = &[
    section("[ATDD Scenario]", Content::Artifact),
    section("[Project Configuration]", Content::Manifest),
    section("[Source File Path of Target Feature]", Content::SourcePath),
    section("[Code]", Content::SourceCode),
];

const GENERATE_SECTIONS: &[Section] = &[
    section(
        "[Reference: Execution & Environment Guide] (Critical)",
        Content::ExecutionGuide,
    ),
    section("[Lessons Learned] (Critical - Must Follow)", Content::Lessons),
    section("[Test Plan]", Content::Artifact),
    section("[Project Configuration]", Content::Manifest),
    section("[Code]", Content::SourceCode),
    section("[Source File Path of Target Feature]", Content::SourcePath),
];

impl Workflow {
    fn recipe(self) -> Recipe {
        match self {
            Workflow::Scenario => Recipe {
                template: templates::SCENARIO_GENERATOR,
                required: None,
                sections: SCENARIO_SECTIONS,
            },
            Workflow::Plan => Recipe {
                template: templates::TEST_ROUTING,
                required: Some(ArtifactKind::Scenario),
                sections: PLAN_SECTIONS,
            },
            Workflow::Generate(test_type) => Recipe {
                template: test_type.template_name(),
                required: Some(ArtifactKind::Plan),
                sections: GENERATE_SECTIONS,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn locate_required(
    root: &Path,
    source: &Path,
    kind: ArtifactKind,
    config: &TestPathConfig,
) -> Result<PathBuf> {
    let absolute = paths::resolve_user_path(root, source);
    let suffix = match kind {
        ArtifactKind::Scenario => &config.atdd_suffix,
        ArtifactKind::Plan => &config.plan_suffix,
    };
    if let Some(found) = locator::locate(root, source, suffix, config) {
        tracing::debug!("using {:?} artifact {}", kind, found.display());
        return Ok(found);
    }
    let candidates = locator::artifact_candidates(&absolute, suffix, config);
    Err(match kind {
        ArtifactKind::Scenario => AtddError::ScenarioArtifactMissing {
            source_path: absolute,
            candidates,
        },
        ArtifactKind::Plan => AtddError::PlanArtifactMissing {
            source_path: absolute,
            candidates,
        },
    })
}

/// Build the prompt for `workflow` from the project at `root`.
///
/// Preconditions are checked before anything is read: the manifest must
/// exist and the workflow's required artifact must be locatable.
pub fn assemble(root: &Path, source: &SourceRef, workflow: Workflow) -> Result<String> {
    let typed = source.typed.as_str();
    let source = source.path.as_path();
    if !Manifest::exists(root) {
        return Err(AtddError::ManifestMissing);
    }
    let recipe = workflow.recipe();

    let artifact = match recipe.required {
        Some(kind) => {
            let config = TestPathConfig::load(root);
            Some(locate_required(root, source, kind, &config)?)
        }
        None => None,
    };

    let manifest = Manifest::read_text(root)?;
    let source_code = io::read_user_file(&paths::resolve_user_path(root, source))?;
    let artifact_text = artifact.as_deref().map(io::read_user_file).transpose()?;
    let template = templates::read_template(recipe.template)?;

    let mut rendered = Vec::with_capacity(recipe.sections.len());
    for section in recipe.sections {
        let text = match section.content {
            Content::Manifest => fenced_block(section.label, "yaml", &manifest),
            Content::SourceCode => block(section.label, &source_code),
            Content::SourcePath => inline(section.label, typed),
            Content::Artifact => block(section.label, artifact_text.as_deref().unwrap_or("")),
            Content::ExecutionGuide => block(
                section.label,
                &templates::read_template(templates::CODING_CONVENTIONS)?,
            ),
            Content::Lessons => {
                let lessons = io::read_optional(&paths::lessons_path(root))?;
                block(
                    section.label,
                    lessons.as_deref().unwrap_or(NO_LESSONS_PLACEHOLDER),
                )
            }
        };
        rendered.push(text);
    }

    Ok(format!(
        "{template}{INPUT_DATA_HEADER}{}\n",
        rendered.join("\n\n")
    ))
}

fn block(label: &str, content: &str) -> String {
    format!("{label}\n<<<\n{content}\n>>>")
}

fn fenced_block(label: &str, lang: &str, content: &str) -> String {
    format!("{label}\n<<<\n```{lang}\n{content}\n```\n>>>")
}

fn inline(label: &str, content: &str) -> String {
    format!("{label}\n<<< {content} >>>")
}

pub fn build_scenario_prompt(root: &Path, source: impl Into<SourceRef>) -> Result<String> {
    assemble(root, &source.into(), Workflow::Scenario)
}

pub fn build_plan_prompt(root: &Path, source: impl Into<SourceRef>) -> Result<String> {
    assemble(root, &source.into(), Workflow::Plan)
}

pub fn build_gen_prompt(
    root: &Path,
    source: impl Into<SourceRef>,
    test_type: TestType,
) -> Result<String> {
    assemble(root, &source.into(), Workflow::Generate(test_type))
}

// ---------------------------------------------------------------------------
// Failure analysis
// ---------------------------------------------------------------------------

pub const FAILED_CODE_TOKEN: &str = "{{FAILED_CODE}}";
pub const ERROR_LOG_TOKEN: &str = "{{ERROR_LOG}}";
pub const EXISTING_LESSONS_TOKEN: &str = "{{EXISTING_LESSONS}}";

/// Fill the feedback-analyzer template. No manifest is required.
pub fn build_learn_prompt(
    failed_code: &str,
    error_log: &str,
    existing_lessons: &str,
) -> Result<String> {
    let template = templates::read_template(templates::FEEDBACK_ANALYZER)?;
    Ok(substitute_once(
        &template,
        &[
            (FAILED_CODE_TOKEN, failed_code),
            (ERROR_LOG_TOKEN, error_log),
            (EXISTING_LESSONS_TOKEN, existing_lessons),
        ],
    ))
}

/// Replace the first occurrence of each token in `template`.
///
/// Positions are taken from the template alone, so a value that happens to
/// contain another token is inserted verbatim. Absent tokens are skipped.
pub fn substitute_once(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut hits: Vec<(usize, usize, &str)> = replacements
        .iter()
        .filter_map(|(token, value)| template.find(token).map(|pos| (pos, token.len(), *value)))
        .collect();
    hits.sort_by_key(|(pos, _, _)| *pos);

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for (pos, len, value) in hits {
        if pos < cursor {
            continue;
        }
        out.push_str(&template[cursor..pos]);
        out.push_str(value);
        cursor = pos + len;
    }
    out.push_str(&template[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
