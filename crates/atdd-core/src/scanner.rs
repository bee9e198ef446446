//! Project scan behind the interactive file picker.
//!
//! Each command offers a different candidate list: `atdd` and `gen` list
//! source files, `plan` lists sources that already have a scenario file, and
//! `learn` lists sources that already have a test file. Candidate paths are
//! relative to the project root.

use crate::config::TestPathConfig;
use crate::paths;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Atdd,
    Plan,
    Gen,
    Learn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Display label, e.g. `/login  (app/(auth)/login/page.tsx)`.
    pub title: String,
    pub path: PathBuf,
    pub group: &'static str,
}

pub const GROUP_UI_PAGES: &str = "UI Pages";
pub const GROUP_COMPONENTS: &str = "Components";
pub const GROUP_HAS_ATDD: &str = "ATDD written";
pub const GROUP_GEN_UI: &str = "UI (--type ui)";
pub const GROUP_GEN_UNIT: &str = "Unit (--type unit)";
pub const GROUP_HAS_TESTS: &str = "Has tests";

const ALWAYS_SKIPPED_DIRS: &[&str] = &["node_modules"];
const SOURCE_SKIPPED_DIRS: &[&str] = &["_tests", "__tests__", "dist", "build", ".next"];
const SOURCE_SKIPPED_MARKERS: &[&str] = &[".test.", ".spec.", ".stories."];

static PAGE_RE: OnceLock<Regex> = OnceLock::new();
static TEST_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn page_re() -> &'static Regex {
    PAGE_RE.get_or_init(|| Regex::new(r"app/(.+)/page\.(tsx|ts|jsx|js)$").unwrap())
}

fn test_file_re() -> &'static Regex {
    TEST_FILE_RE.get_or_init(|| Regex::new(r"\.(test|spec)\.(ts|tsx)$").unwrap())
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

pub fn scan(root: &Path, target: ScanTarget, config: &TestPathConfig) -> Vec<FileCandidate> {
    let mut candidates = match target {
        ScanTarget::Atdd => scan_for_atdd(root, config),
        ScanTarget::Plan => scan_for_plan(root, config),
        ScanTarget::Gen => scan_for_gen(root, config),
        ScanTarget::Learn => scan_for_learn(root),
    };
    candidates.sort_by(|a, b| (a.group, &a.path).cmp(&(b.group, &b.path)));
    candidates.dedup_by(|a, b| a.group == b.group && a.path == b.path);
    tracing::debug!("{:?} scan found {} candidates", target, candidates.len());
    candidates
}

fn scan_for_atdd(root: &Path, config: &TestPathConfig) -> Vec<FileCandidate> {
    source_files(root, config)
        .into_iter()
        .filter(|p| has_extension(p, &["tsx", "jsx"]))
        .map(|p| {
            let (title, is_page) = display_title(&p);
            FileCandidate {
                title: format!("{title}  ({})", slash(&p)),
                group: if is_page { GROUP_UI_PAGES } else { GROUP_COMPONENTS },
                path: p,
            }
        })
        .collect()
}

fn scan_for_plan(root: &Path, config: &TestPathConfig) -> Vec<FileCandidate> {
    let suffix = config.atdd_suffix.as_str();
    all_files(root, |_| true)
        .into_iter()
        .filter_map(|atdd| {
            let name = atdd.file_name()?.to_string_lossy().into_owned();
            let base = name.strip_suffix(suffix)?;
            let dir = atdd.parent().unwrap_or(Path::new(""));
            let options = [
                dir.join(format!("{base}.tsx")),
                dir.join(format!("{base}.ts")),
                dir.join("..").join(format!("{base}.tsx")),
                dir.join("..").join(format!("{base}.ts")),
                dir.join("..").join("page.tsx"),
                dir.join("page.tsx"),
            ];
            let source = first_existing(root, &options)?;
            let (title, _) = display_title(&source);
            Some(FileCandidate {
                title: format!("{title}  (ATDD ready)"),
                path: source,
                group: GROUP_HAS_ATDD,
            })
        })
        .collect()
}

fn scan_for_gen(root: &Path, config: &TestPathConfig) -> Vec<FileCandidate> {
    let files = source_files(root, config);
    let ui = files.iter().filter(|p| has_extension(p, &["tsx", "jsx"])).map(|p| {
        let (title, _) = display_title(p);
        FileCandidate {
            title: format!("{title}  ({})", slash(p)),
            path: p.clone(),
            group: GROUP_GEN_UI,
        }
    });
    let unit = files
        .iter()
        .filter(|p| has_extension(p, &["ts", "js"]) && !slash(p).ends_with(".d.ts"))
        .map(|p| FileCandidate {
            title: format!("{}  ({})", file_name(p), slash(p)),
            path: p.clone(),
            group: GROUP_GEN_UNIT,
        });
    ui.chain(unit).collect()
}

fn scan_for_learn(root: &Path) -> Vec<FileCandidate> {
    all_files(root, |p| test_file_re().is_match(&slash(p)))
        .into_iter()
        .filter_map(|test| {
            let name = file_name(&test);
            let base = test_file_re().replace(&name, "").into_owned();
            let dir = test.parent().unwrap_or(Path::new(""));
            let options = [
                dir.join(format!("{base}.tsx")),
                dir.join(format!("{base}.ts")),
                dir.join("..").join(format!("{base}.tsx")),
                dir.join("..").join(format!("{base}.ts")),
                dir.join("..").join("page.tsx"),
            ];
            let source = first_existing(root, &options)?;
            let (title, _) = display_title(&source);
            Some(FileCandidate {
                title: format!("{title}  (test: {name})"),
                path: source,
                group: GROUP_HAS_TESTS,
            })
        })
        .collect()
}

/// Case-insensitive substring match on title or path.
pub fn filter_candidates<'a>(candidates: &'a [FileCandidate], keyword: &str) -> Vec<&'a FileCandidate> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return candidates.iter().collect();
    }
    candidates
        .iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&keyword)
                || slash(&c.path).to_lowercase().contains(&keyword)
        })
        .collect()
}

/// `app/(auth)/login/page.tsx` → `/login`. Non-page paths come back unchanged.
pub fn file_path_to_route(path: &str) -> String {
    let Some(caps) = page_re().captures(path) else {
        return path.to_string();
    };
    let segments: Vec<&str> = caps[1]
        .split('/')
        .filter(|s| !(s.starts_with('(') && s.ends_with(')')))
        .collect();
    format!("/{}", segments.join("/"))
}

// ---------------------------------------------------------------------------
// Walking
// ---------------------------------------------------------------------------

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn all_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    walk(root, ALWAYS_SKIPPED_DIRS, &[])
        .into_iter()
        .filter(|p| keep(p.as_path()))
        .collect()
}

fn source_files(root: &Path, config: &TestPathConfig) -> Vec<PathBuf> {
    let mut skipped: Vec<&str> = ALWAYS_SKIPPED_DIRS.to_vec();
    skipped.extend_from_slice(SOURCE_SKIPPED_DIRS);
    skipped.push(config.dir_name.as_str());
    walk(root, &skipped, SOURCE_SKIPPED_MARKERS)
}

fn walk(root: &Path, skipped_dirs: &[&str], skipped_markers: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if is_hidden(e) {
                return false;
            }
            !(e.file_type().is_dir()
                && skipped_dirs.iter().any(|d| e.file_name().to_string_lossy() == *d))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            !skipped_markers.iter().any(|m| name.contains(m))
        })
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

fn first_existing(root: &Path, options: &[PathBuf]) -> Option<PathBuf> {
    options
        .iter()
        .map(|p| paths::normalize(p))
        .find(|p| root.join(p).is_file())
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.contains(&e))
}

/// Route for App Router pages, file name for everything else.
fn display_title(path: &Path) -> (String, bool) {
    let rel = slash(path);
    if rel.contains("/page.") {
        (file_path_to_route(&rel), true)
    } else {
        (file_name(path), false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn paths_of(candidates: &[FileCandidate]) -> Vec<String> {
        candidates.iter().map(|c| slash(&c.path)).collect()
    }

    #[test]
    fn route_strips_groups() {
        assert_eq!(file_path_to_route("app/(auth)/login/page.tsx"), "/login");
        assert_eq!(file_path_to_route("src/app/user/(public)/profile/page.jsx"), "/user/profile");
        assert_eq!(file_path_to_route("components/Button.tsx"), "components/Button.tsx");
    }

    #[test]
    fn atdd_scan_lists_renderable_sources_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/(auth)/login/page.tsx");
        touch(dir.path(), "components/Button.jsx");
        touch(dir.path(), "components/Button.test.tsx");
        touch(dir.path(), "components/Button.stories.tsx");
        touch(dir.path(), "app/(auth)/login/_tests/helper.tsx");
        touch(dir.path(), "node_modules/pkg/index.tsx");
        touch(dir.path(), ".next/server/page.tsx");
        touch(dir.path(), "lib/api.ts");

        let got = scan(dir.path(), ScanTarget::Atdd, &TestPathConfig::default());
        assert_eq!(paths_of(&got), vec!["components/Button.jsx", "app/(auth)/login/page.tsx"]);
        assert_eq!(got[0].group, GROUP_COMPONENTS);
        assert_eq!(got[0].title, "Button.jsx  (components/Button.jsx)");
        assert_eq!(got[1].group, GROUP_UI_PAGES);
        assert_eq!(got[1].title, "/login  (app/(auth)/login/page.tsx)");
    }

    #[test]
    fn plan_scan_maps_scenarios_back_to_sources() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/login/page.tsx");
        touch(dir.path(), "app/login/_tests/login.atdd.md");
        touch(dir.path(), "lib/auth.ts");
        touch(dir.path(), "lib/auth.atdd.md");
        touch(dir.path(), "orphan/ghost.atdd.md");

        let got = scan(dir.path(), ScanTarget::Plan, &TestPathConfig::default());
        assert_eq!(paths_of(&got), vec!["app/login/page.tsx", "lib/auth.ts"]);
        assert!(got.iter().all(|c| c.group == GROUP_HAS_ATDD));
        assert_eq!(got[0].title, "/login  (ATDD ready)");
    }

    #[test]
    fn gen_scan_splits_ui_and_unit() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/login/page.tsx");
        touch(dir.path(), "hooks/useAuth.ts");
        touch(dir.path(), "types/global.d.ts");

        let got = scan(dir.path(), ScanTarget::Gen, &TestPathConfig::default());
        let groups: Vec<_> = got.iter().map(|c| (c.group, slash(&c.path))).collect();
        assert_eq!(
            groups,
            vec![
                (GROUP_GEN_UI, "app/login/page.tsx".to_string()),
                (GROUP_GEN_UNIT, "hooks/useAuth.ts".to_string()),
            ]
        );
    }

    #[test]
    fn learn_scan_looks_one_level_up() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/login/page.tsx");
        touch(dir.path(), "app/login/_tests/login.test.tsx");
        touch(dir.path(), "lib/format.ts");
        touch(dir.path(), "lib/format.spec.ts");

        let got = scan(dir.path(), ScanTarget::Learn, &TestPathConfig::default());
        assert_eq!(paths_of(&got), vec!["app/login/page.tsx", "lib/format.ts"]);
        assert_eq!(got[0].title, "/login  (test: login.test.tsx)");
    }

    #[test]
    fn filter_matches_title_or_path() {
        let candidates = vec![
            FileCandidate {
                title: "/login  (app/(auth)/login/page.tsx)".to_string(),
                path: PathBuf::from("app/(auth)/login/page.tsx"),
                group: GROUP_UI_PAGES,
            },
            FileCandidate {
                title: "useAuth.ts  (hooks/useAuth.ts)".to_string(),
                path: PathBuf::from("hooks/useAuth.ts"),
                group: GROUP_GEN_UNIT,
            },
        ];
        assert_eq!(filter_candidates(&candidates, "LOGIN").len(), 1);
        assert_eq!(filter_candidates(&candidates, "auth").len(), 2);
        assert_eq!(filter_candidates(&candidates, "  ").len(), 2);
        assert!(filter_candidates(&candidates, "zzz").is_empty());
    }
}
