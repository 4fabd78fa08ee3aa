use serde_json::{Map, Value};

/// Split a course document into its delimited metadata block and body.
///
/// The block is delimited by a `---` line at the very top and a matching
/// closing `---` line. Returns `(None, full_text)` when there is no opening
/// delimiter at line 0 or the block is never closed.
pub fn split_frontmatter(text: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim()) != Some("---") {
        return (None, text.to_string());
    }
    for i in 1..lines.len() {
        if lines[i].trim() == "---" {
            return (Some(lines[1..i].join("\n")), lines[i + 1..].join("\n"));
        }
    }
    (None, text.to_string())
}

/// Parse a metadata block into a key→value mapping. Total: any input yields
/// a mapping, possibly empty.
///
/// Prefers full YAML; a parse failure or a non-mapping document falls
/// through to the tolerant line grammar.
pub fn parse_frontmatter(block: Option<&str>) -> Map<String, Value> {
    let Some(block) = block else {
        return Map::new();
    };
    if block.trim().is_empty() {
        return Map::new();
    }
    if let Some(map) = parse_structured(block) {
        return map;
    }
    parse_tolerant(block)
}

fn parse_structured(block: &str) -> Option<Map<String, Value>> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(block).ok()?;
    let json = serde_json::to_value(yaml).ok()?;
    match json {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Minimal `key: value` dialect with `- item` sequences, `#` comments and
/// scalar coercion (bool, then integer, else string). Never fails.
pub fn parse_tolerant(block: &str) -> Map<String, Value> {
    let mut out = Map::new();
    let mut current_key: Option<String> = None;

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let (Some(key), Some(item)) = (current_key.as_ref(), line.strip_prefix("- ")) {
            let item = Value::String(item.trim().to_string());
            let slot = out
                .entry(key.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(item),
                // a scalar was assigned to this key earlier; the list wins
                other => *other = Value::Array(vec![item]),
            }
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = value.trim();
        current_key = Some(key.clone());
        out.insert(key, coerce_scalar(value));
    }
    out
}

fn coerce_scalar(value: &str) -> Value {
    if value.is_empty() {
        // anticipates following "- item" lines
        return Value::Array(Vec::new());
    }
    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    Value::String(value.to_string())
}

/// First value present under any of the accepted key aliases.
pub fn value_get<'a>(fm: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fm.get(*k))
}

/// Render a metadata value as plain text (no quoting for scalars).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a value into a list of trimmed, non-empty strings. A native list
/// maps element-wise, a string splits on commas, any other scalar wraps into
/// a one-element list.
pub fn listify(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        other => {
            let s = value_to_string(other).trim().to_string();
            if s.is_empty() { Vec::new() } else { vec![s] }
        }
    }
}

/// Non-negative integer coercion. Tolerates float-like strings (truncating
/// toward zero), fails closed to `default` for booleans, negatives and
/// anything unparseable.
pub fn as_uint(value: Option<&Value>, default: u32) -> u32 {
    let Some(value) = value else {
        return default;
    };
    let n = match value {
        Value::Bool(_) => None,
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    n.and_then(|n| u32::try_from(n).ok()).unwrap_or(default)
}

/// Boolean coercion: native booleans pass through, everything else is
/// string-equality against "true", case-insensitive.
pub fn as_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(other) => value_to_string(other).trim().eq_ignore_ascii_case("true"),
        None => false,
    }
}
