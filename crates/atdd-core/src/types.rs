use crate::error::AtddError;
use crate::templates;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// TestType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestType {
    #[default]
    Ui,
    Unit,
}

impl TestType {
    pub fn all() -> &'static [TestType] {
        &[TestType::Ui, TestType::Unit]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Ui => "ui",
            TestType::Unit => "unit",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            TestType::Ui => "UI",
            TestType::Unit => "Unit",
        }
    }

    pub fn template_name(self) -> &'static str {
        match self {
            TestType::Ui => templates::UI_TEST_IMPLEMENTATION,
            TestType::Unit => templates::BUSINESS_LOGIC_TEST,
        }
    }

    /// Files that render (`.tsx`/`.jsx`) get UI tests, the rest unit tests.
    pub fn infer_from_path(path: &Path) -> TestType {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => TestType::Ui,
            _ => TestType::Unit,
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = AtddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" => Ok(TestType::Ui),
            "unit" => Ok(TestType::Unit),
            _ => Err(AtddError::InvalidTestType(s.to_string())),
        }
    }
}
