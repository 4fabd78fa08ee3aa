use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::DEFAULT_CATEGORY;
use crate::frontmatter::{as_bool, as_uint, listify, value_get, value_to_string};

/// Key aliases accepted per field, first match wins. Spelling and diacritic
/// variants of the same semantic key.
const CODE_KEYS: [&str; 3] = ["sigla", "código", "codigo"];
const NAME_KEYS: [&str; 1] = ["nombre"];
const CREDITS_KEYS: [&str; 2] = ["créditos", "creditos"];
const PASSED_KEYS: [&str; 1] = ["aprobado"];
const CATEGORY_KEYS: [&str; 2] = ["concentracion", "concentración"];
const PREREQUISITES_KEYS: [&str; 1] = ["prerrequisitos"];
const OFFERED_KEYS: [&str; 1] = ["semestreOfrecido"];

/// "no prerequisite" marker, filtered out of prerequisite lists.
const NO_PREREQ_MARKER: &str = "nt";

/// One discovered course instance. Identity is the file's base-relative
/// path, stable across scans; the owning term is referenced by id only.
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub course_id: String,
    #[serde(rename = "fileRel")]
    pub file_rel: String,
    pub term_id: String,
    #[serde(rename = "sigla")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "creditos")]
    pub credits: u32,
    #[serde(rename = "aprobado")]
    pub passed: bool,
    #[serde(rename = "concentracion")]
    pub category: String,
    #[serde(rename = "prerrequisitos")]
    pub prerequisites: Vec<String>,
    #[serde(rename = "semestreOfrecido")]
    pub offered_terms: Vec<String>,
    /// Full parsed metadata mapping, passed through verbatim for the UI.
    pub frontmatter: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Course {
    /// Build a course record from its parsed metadata. Every field takes a
    /// safe default when absent or uncoercible.
    pub fn from_frontmatter(
        fm: Map<String, Value>,
        file_rel: &str,
        term_id: &str,
        file_stem: &str,
    ) -> Self {
        let code = value_get(&fm, &CODE_KEYS)
            .map(|v| value_to_string(v).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| file_stem.to_string());

        let name = value_get(&fm, &NAME_KEYS)
            .map(|v| value_to_string(v).trim().to_string())
            .unwrap_or_default();

        let credits = as_uint(value_get(&fm, &CREDITS_KEYS), 0);
        let passed = as_bool(value_get(&fm, &PASSED_KEYS));

        let category = match value_get(&fm, &CATEGORY_KEYS) {
            Some(Value::Array(items)) => items.first().map(value_to_string),
            Some(other) => Some(value_to_string(other)),
            None => None,
        }
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let prerequisites = listify(value_get(&fm, &PREREQUISITES_KEYS))
            .into_iter()
            .filter(|p| !p.eq_ignore_ascii_case(NO_PREREQ_MARKER))
            .collect();

        let offered_terms = listify(value_get(&fm, &OFFERED_KEYS));

        Self {
            course_id: file_rel.to_string(),
            file_rel: file_rel.to_string(),
            term_id: term_id.to_string(),
            code,
            name,
            credits,
            passed,
            category,
            prerequisites,
            offered_terms,
            frontmatter: fm,
            error: None,
        }
    }

    /// Record for a file that could not be read. Emitted instead of being
    /// dropped so the catalog size never shrinks on unreadable files.
    pub fn unreadable(file_rel: &str, term_id: &str, file_stem: &str, error: String) -> Self {
        Self {
            course_id: file_rel.to_string(),
            file_rel: file_rel.to_string(),
            term_id: term_id.to_string(),
            code: file_stem.to_string(),
            name: String::new(),
            credits: 0,
            passed: false,
            category: DEFAULT_CATEGORY.to_string(),
            prerequisites: Vec::new(),
            offered_terms: Vec::new(),
            frontmatter: Map::new(),
            error: Some(error),
        }
    }
}
