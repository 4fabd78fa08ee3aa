use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{APP_NAME, APP_VERSION, COURSE_DIR_ALIASES, COURSE_FILE_EXT, MAX_SCAN_DEPTH};
use crate::frontmatter::{parse_frontmatter, split_frontmatter};
use crate::models::{Course, Term, parse_term, term_id, term_sort_key};

/// Diagnostics for one discovery pass, surfaced to the UI as-is.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub app_name: &'static str,
    pub app_version: &'static str,
    pub base_dir: String,
    pub mode: Option<String>,
    pub terms_detected: usize,
    pub md_found_total: usize,
    pub warnings: Vec<String>,
    pub term_dirs: Vec<TermDirReport>,
}

#[derive(Debug, Serialize)]
pub struct TermDirReport {
    pub term_id: String,
    #[serde(rename = "folderName")]
    pub folder_name: String,
    #[serde(rename = "searchRootRel")]
    pub search_root_rel: String,
    #[serde(rename = "mdCount")]
    pub md_count: usize,
    #[serde(rename = "hasCoursesDir")]
    pub has_courses_dir: bool,
}

pub struct Catalog {
    pub terms: Vec<Term>,
    pub courses: Vec<Course>,
    pub report: ScanReport,
}

/// Base-relative display path; falls back to the full path when the prefix
/// does not apply.
pub fn rel(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Locate term folders under `base`. Direct children win; only when none
/// match does the bounded-depth recursive fallback run. A matched folder is
/// never searched inside for nested term folders.
pub fn find_terms(base: &Path) -> (Vec<PathBuf>, String) {
    let mut direct: Vec<PathBuf> = fs::read_dir(base)
        .into_iter()
        .flatten()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir() && parse_term(&dir_name(p)).is_some())
        .collect();
    if !direct.is_empty() {
        direct.sort_by_key(|p| term_sort_key(&dir_name(p)));
        return (direct, "direct".to_string());
    }

    let mut found = Vec::new();
    let mut walker = WalkDir::new(base)
        .min_depth(1)
        .max_depth(MAX_SCAN_DEPTH)
        .into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if entry.file_type().is_dir()
            && parse_term(&entry.file_name().to_string_lossy()).is_some()
        {
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    found.sort_by_key(|p| term_sort_key(&dir_name(p)));
    let mut seen = HashSet::new();
    let deduped = found
        .into_iter()
        .filter(|p| seen.insert(p.canonicalize().unwrap_or_else(|_| p.clone())))
        .collect();
    (deduped, format!("fallback_depth{MAX_SCAN_DEPTH}"))
}

/// Resolve the course-bearing subfolder of a term folder: accepted alias
/// names first (case-sensitive, in order), then case-insensitive matches.
/// Without one, the term folder itself is searched.
pub fn find_courses_root(term_dir: &Path) -> (PathBuf, bool) {
    for name in COURSE_DIR_ALIASES {
        let p = term_dir.join(name);
        if p.is_dir() {
            return (p, true);
        }
    }
    if let Ok(entries) = fs::read_dir(term_dir) {
        for entry in entries.flatten() {
            let p = entry.path();
            if !p.is_dir() {
                continue;
            }
            let lower = entry.file_name().to_string_lossy().to_lowercase();
            if COURSE_DIR_ALIASES.iter().any(|a| a.to_lowercase() == lower) {
                return (p, true);
            }
        }
    }
    (term_dir.to_path_buf(), false)
}

/// Every course file under `root`, sorted by path for determinism.
pub fn list_course_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(COURSE_FILE_EXT))
        .collect();
    files.sort();
    files
}

/// Full discovery pass: terms, courses and diagnostics. Per-file failures
/// degrade to error-flagged course records; this function itself never
/// fails.
pub fn discover_all(base: &Path) -> Catalog {
    let mut report = ScanReport {
        app_name: APP_NAME,
        app_version: APP_VERSION,
        base_dir: base.to_string_lossy().into_owned(),
        mode: None,
        terms_detected: 0,
        md_found_total: 0,
        warnings: Vec::new(),
        term_dirs: Vec::new(),
    };

    if !base.exists() {
        report
            .warnings
            .push(format!("Base dir no existe: {}", base.display()));
        return Catalog {
            terms: Vec::new(),
            courses: Vec::new(),
            report,
        };
    }

    let (term_dirs, mode) = find_terms(base);
    report.terms_detected = term_dirs.len();
    report.mode = Some(mode);

    let mut terms = Vec::new();
    let mut courses = Vec::new();

    for tdir in &term_dirs {
        let folder_name = dir_name(tdir);
        let Some((year, session)) = parse_term(&folder_name) else {
            continue;
        };
        let tid = term_id(year, session);

        let (root, has_courses_dir) = find_courses_root(tdir);
        let files = list_course_files(&root);
        report.md_found_total += files.len();

        terms.push(Term {
            term_id: tid.clone(),
            year,
            session,
            code: session.code(),
            folder_name: folder_name.clone(),
            folder_rel: rel(tdir, base),
            search_root_rel: rel(&root, base),
            has_courses_dir,
        });
        report.term_dirs.push(TermDirReport {
            term_id: tid.clone(),
            folder_name,
            search_root_rel: rel(&root, base),
            md_count: files.len(),
            has_courses_dir,
        });

        for file in files {
            let file_rel = rel(&file, base);
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match fs::read(&file) {
                Ok(bytes) => {
                    // undecodable bytes are replaced, not fatal
                    let text = String::from_utf8_lossy(&bytes);
                    let (block, _body) = split_frontmatter(&text);
                    let fm = parse_frontmatter(block.as_deref());
                    courses.push(Course::from_frontmatter(fm, &file_rel, &tid, &stem));
                }
                Err(e) => {
                    warn!("unreadable course file {}: {}", file_rel, e);
                    courses.push(Course::unreadable(
                        &file_rel,
                        &tid,
                        &stem,
                        format!("No se pudo leer: {e}"),
                    ));
                }
            }
        }
    }

    info!(
        "scan complete: {} terms, {} courses ({})",
        terms.len(),
        courses.len(),
        report.mode.as_deref().unwrap_or("-")
    );

    Catalog {
        terms,
        courses,
        report,
    }
}
