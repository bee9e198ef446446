use crate::error::{AtddError, Result};
use crate::paths;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const DEFAULT_DIR_NAME: &str = "_tests";
pub const DEFAULT_ATDD_SUFFIX: &str = ".atdd.md";
pub const DEFAULT_PLAN_SUFFIX: &str = ".test-plan.md";
pub const DEFAULT_TEST_COMMAND: &str = "npm test --";

// ---------------------------------------------------------------------------
// Manifest (as authored)
// ---------------------------------------------------------------------------

/// The subset of `project-manifest.yaml` this tool reads. Every field is
/// optional; the rest of the document is passed to prompts verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub test_paths: Option<TestPathsSection>,
    #[serde(default)]
    pub test_command: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPathsSection {
    #[serde(default)]
    pub dir_name: Option<String>,
    #[serde(default)]
    pub atdd_suffix: Option<String>,
    #[serde(default)]
    pub plan_suffix: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl Manifest {
    pub fn exists(root: &Path) -> bool {
        paths::manifest_path(root).exists()
    }

    /// Raw manifest text, as embedded into prompts.
    pub fn read_text(root: &Path) -> Result<String> {
        let path = paths::manifest_path(root);
        if !path.exists() {
            return Err(AtddError::ManifestMissing);
        }
        std::fs::read_to_string(&path).map_err(|cause| AtddError::FileRead { path, cause })
    }

    pub fn load(root: &Path) -> Result<Self> {
        let data = Self::read_text(root)?;
        let manifest: Manifest = serde_yaml::from_str(&data)?;
        Ok(manifest)
    }
}

// ---------------------------------------------------------------------------
// PlacementMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    #[default]
    CoLocation,
    Separated,
}

impl PlacementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlacementMode::CoLocation => "co-location",
            PlacementMode::Separated => "separated",
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlacementMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "co-location" => Ok(PlacementMode::CoLocation),
            "separated" => Ok(PlacementMode::Separated),
            other => Err(format!("unknown placement mode '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// TestPathConfig (resolved)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPathConfig {
    pub dir_name: String,
    pub atdd_suffix: String,
    pub plan_suffix: String,
    pub mode: PlacementMode,
}

impl Default for TestPathConfig {
    fn default() -> Self {
        Self {
            dir_name: DEFAULT_DIR_NAME.to_string(),
            atdd_suffix: DEFAULT_ATDD_SUFFIX.to_string(),
            plan_suffix: DEFAULT_PLAN_SUFFIX.to_string(),
            mode: PlacementMode::default(),
        }
    }
}

impl TestPathConfig {
    /// Merge a partially-authored `testPaths` section over the defaults,
    /// one field at a time.
    pub fn merge(section: Option<&TestPathsSection>) -> Self {
        let Some(section) = section else {
            return Self::default();
        };

        let mode = match non_empty(section.mode.as_deref()) {
            None => PlacementMode::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{e} in testPaths.mode, using co-location");
                PlacementMode::default()
            }),
        };

        Self {
            dir_name: coalesce(section.dir_name.as_deref(), DEFAULT_DIR_NAME),
            atdd_suffix: coalesce(section.atdd_suffix.as_deref(), DEFAULT_ATDD_SUFFIX),
            plan_suffix: coalesce(section.plan_suffix.as_deref(), DEFAULT_PLAN_SUFFIX),
            mode,
        }
    }

    /// Load from the manifest in `root`. Never fails: a missing or malformed
    /// manifest yields the defaults.
    pub fn load(root: &Path) -> Self {
        match Manifest::load(root) {
            Ok(manifest) => Self::merge(manifest.test_paths.as_ref()),
            Err(e) => {
                tracing::debug!("using default test paths: {e}");
                Self::default()
            }
        }
    }
}

/// The configured test command prefix, or `npm test --`.
pub fn load_test_command(root: &Path) -> String {
    match Manifest::load(root) {
        Ok(manifest) => coalesce(manifest.test_command.as_deref(), DEFAULT_TEST_COMMAND),
        Err(e) => {
            tracing::debug!("using default test command: {e}");
            DEFAULT_TEST_COMMAND.to_string()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn coalesce(value: Option<&str>, default: &str) -> String {
    non_empty(value).unwrap_or(default).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, yaml: &str) {
        std::fs::write(dir.path().join(paths::MANIFEST_FILE), yaml).unwrap();
    }

    #[test]
    fn missing_manifest_yields_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TestPathConfig::load(dir.path()), TestPathConfig::default());
        assert_eq!(load_test_command(dir.path()), "npm test --");
    }

    #[test]
    fn unparsable_manifest_yields_defaults() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "testPaths: [unclosed");
        assert_eq!(TestPathConfig::load(dir.path()), TestPathConfig::default());
        assert_eq!(load_test_command(dir.path()), DEFAULT_TEST_COMMAND);
    }

    #[test]
    fn fields_default_independently() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "testPaths:\n  dirName: custom\n");
        let cfg = TestPathConfig::load(dir.path());
        assert_eq!(cfg.dir_name, "custom");
        assert_eq!(cfg.atdd_suffix, ".atdd.md");
        assert_eq!(cfg.plan_suffix, ".test-plan.md");
        assert_eq!(cfg.mode, PlacementMode::CoLocation);
    }

    #[test]
    fn all_fields_overridden() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            &dir,
            r#"
project: web
testPaths:
  dirName: __specs__
  atddSuffix: .spec.md
  planSuffix: .plan.md
  mode: separated
testCommand: yarn vitest run
"#,
        );
        let cfg = TestPathConfig::load(dir.path());
        assert_eq!(cfg.dir_name, "__specs__");
        assert_eq!(cfg.atdd_suffix, ".spec.md");
        assert_eq!(cfg.plan_suffix, ".plan.md");
        assert_eq!(cfg.mode, PlacementMode::Separated);
        assert_eq!(load_test_command(dir.path()), "yarn vitest run");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let section = TestPathsSection {
            dir_name: Some(String::new()),
            atdd_suffix: Some(".a.md".to_string()),
            plan_suffix: None,
            mode: Some(String::new()),
        };
        let cfg = TestPathConfig::merge(Some(&section));
        assert_eq!(cfg.dir_name, "_tests");
        assert_eq!(cfg.atdd_suffix, ".a.md");
        assert_eq!(cfg.plan_suffix, ".test-plan.md");
        assert_eq!(cfg.mode, PlacementMode::CoLocation);
    }

    #[test]
    fn unknown_mode_keeps_other_fields() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "testPaths:\n  dirName: t\n  mode: sideways\n");
        let cfg = TestPathConfig::load(dir.path());
        assert_eq!(cfg.dir_name, "t");
        assert_eq!(cfg.mode, PlacementMode::CoLocation);
    }

    #[test]
    fn read_text_without_manifest_is_manifest_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Manifest::read_text(dir.path()),
            Err(AtddError::ManifestMissing)
        ));
    }

    #[test]
    fn placement_mode_strings_are_stable() {
        assert_eq!(PlacementMode::CoLocation.to_string(), "co-location");
        assert_eq!("separated".parse::<PlacementMode>(), Ok(PlacementMode::Separated));
    }
}
