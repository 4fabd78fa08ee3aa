use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// User-editable overlay layered on top of the discovered catalog.
/// Persisted as a single JSON document; mutated only by whole-document
/// replace-and-sanitize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// UI display order of term ids.
    pub term_order: Vec<String>,
    /// course_id → term_id placement overrides.
    pub placements: BTreeMap<String, String>,
    /// User-defined terms not backed by any folder.
    pub custom_terms: Vec<Value>,
    /// Persisted ignore flags by warning id.
    pub ignored_warnings: BTreeMap<String, bool>,
    /// Courses that exist only in the draft, not backed by any file.
    pub temp_courses: Vec<Map<String, Value>>,
}

fn field_or_default<T: DeserializeOwned + Default>(obj: &mut Map<String, Value>, key: &str) -> T {
    obj.remove(key)
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default()
}

impl Draft {
    /// Total sanitizer: any JSON value yields a well-shaped draft. A field
    /// of the wrong shape is replaced by its empty default; `temp_courses`
    /// additionally drops non-object elements instead of rejecting the
    /// whole field. Idempotent.
    pub fn sanitize(raw: Value) -> Draft {
        let Value::Object(mut obj) = raw else {
            return Draft::default();
        };

        let temp_courses = match obj.remove("temp_courses") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(m) => Some(m),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        Draft {
            term_order: field_or_default(&mut obj, "term_order"),
            placements: field_or_default(&mut obj, "placements"),
            custom_terms: field_or_default(&mut obj, "custom_terms"),
            ignored_warnings: field_or_default(&mut obj, "ignored_warnings"),
            temp_courses,
        }
    }
}
