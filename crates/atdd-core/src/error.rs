use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtddError {
    #[error("project-manifest.yaml not found: run 'atdd-prompt init'")]
    ManifestMissing,

    #[error("ATDD scenario file not found for {}", source_path.display())]
    ScenarioArtifactMissing {
        source_path: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("test plan file not found for {}", source_path.display())]
    PlanArtifactMissing {
        source_path: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("test file not found for {}", source_path.display())]
    TestFileMissing {
        source_path: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("cannot read {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("prompt template not found: {0}")]
    TemplateNotFound(String),

    #[error("invalid test type '{0}': expected one of ui, unit")]
    InvalidTestType(String),

    #[error("test run interrupted")]
    Interrupted,

    #[error("no clipboard tool found: install pbcopy, wl-copy, xclip or xsel")]
    NoClipboardTool,

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl AtddError {
    /// Candidate paths the locator tried, for the artifact-missing kinds.
    pub fn attempted(&self) -> &[PathBuf] {
        match self {
            AtddError::ScenarioArtifactMissing { candidates, .. }
            | AtddError::PlanArtifactMissing { candidates, .. }
            | AtddError::TestFileMissing { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, AtddError>;
