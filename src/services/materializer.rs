use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::config::COURSE_DIR_CANONICAL;
use crate::error::AppError;
use crate::frontmatter::value_to_string;
use crate::models::parse_term;
use crate::services::catalog::{find_courses_root, rel};

static UNSAFE_STEM_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("stem regex"));

/// Fixed computational snippet appended to every materialized course file.
const NOTE_BODY: &str = r#"```dataviewjs
let notas = dv.pages().where(b=>b.file.frontmatter.Curso === dv.current().file.name).file.frontmatter.notaObtenida
let pond = dv.pages().where(b=>b.file.frontmatter.Curso === dv.current().file.name).file.frontmatter.Ponderación
let sigla = dv.pages().where(b=>b.file.frontmatter.Curso === dv.current().file.name).file.link
let arr = []
let nf = 0
for(i=0;i<=notas.length-1;i++){
    arr.push([sigla[i],notas[i],pond[i]])
    nf = nf + notas[i]*pond[i]
}
nf = Math.round(nf*10)/10
dv.table(["Evaluación","Nota","Ponderación"],arr)
dv.paragraph("$$\\Huge{\\text{NFC}="+nf+"}$$")
```"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaterializePayload {
    pub term_id: String,
    pub sigla: Option<Value>,
    pub nombre: Option<Value>,
    pub creditos: Option<Value>,
    pub aprobado: Option<Value>,
    #[serde(alias = "concentración")]
    pub concentracion: Option<Value>,
    pub prerrequisitos: Option<Value>,
    #[serde(rename = "semestreOfrecido")]
    pub semestre_ofrecido: Option<Value>,
    pub frontmatter: Option<Value>,
}

fn explicit_string(value: Option<&Value>) -> Option<String> {
    value
        .map(|v| value_to_string(v).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn explicit_value(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

fn sanitize_stem(code: &str) -> String {
    let stem = UNSAFE_STEM_CHARS.replace_all(code, "_").into_owned();
    if stem.is_empty() {
        "curso".to_string()
    } else {
        stem
    }
}

/// Create a new course file under the payload's term folder.
///
/// Merge precedence is uniform: explicit payload field > existing
/// `frontmatter` key > computed default. Fails without writing anything on
/// an invalid term code, an empty code, or a destination escaping the term
/// directory.
pub fn materialize(base: &Path, payload: Value) -> Result<String, AppError> {
    let payload: MaterializePayload = serde_json::from_value(payload)
        .map_err(|_| AppError::Validation("Payload inválido".to_string()))?;

    let term_id = payload.term_id.trim().to_string();
    let Some((year, session)) = parse_term(&term_id) else {
        return Err(AppError::Validation("term_id inválido".to_string()));
    };

    let mut fm: Map<String, Value> = match payload.frontmatter {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let sigla = explicit_string(payload.sigla.as_ref())
        .or_else(|| explicit_string(fm.get("sigla")))
        .ok_or_else(|| AppError::Validation("sigla obligatoria".to_string()))?;

    // crafted codes never reach the filesystem, sanitized or not
    if sigla.contains('/') || sigla.contains('\\') || sigla.contains("..") {
        return Err(AppError::PathSafety(sigla.clone()));
    }

    // explicit payload fields overwrite existing metadata
    fm.insert("sigla".to_string(), Value::String(sigla.clone()));
    if let Some(nombre) = explicit_string(payload.nombre.as_ref()) {
        fm.insert("nombre".to_string(), Value::String(nombre));
    }
    if let Some(v) = explicit_value(payload.creditos) {
        fm.insert("creditos".to_string(), v);
    }
    if let Some(v) = explicit_value(payload.aprobado) {
        fm.insert("aprobado".to_string(), v);
    }
    if let Some(v) = explicit_value(payload.concentracion) {
        fm.insert("concentracion".to_string(), v);
    }
    if let Some(v) = explicit_value(payload.prerrequisitos) {
        fm.insert("prerrequisitos".to_string(), v);
    }
    if let Some(v) = explicit_value(payload.semestre_ofrecido) {
        fm.insert("semestreOfrecido".to_string(), v);
    }

    // computed bookkeeping fields fill only when absent
    fm.entry("aprobado").or_insert(Value::Bool(false));
    fm.entry("semestre").or_insert(json!(session.number()));
    fm.entry("año").or_insert(json!(year));
    fm.entry("sección").or_insert(json!(0));
    fm.entry("notaObtenida").or_insert(json!(0));
    fm.entry("dg-publish").or_insert(Value::Bool(true));

    let term_dir = base.join(&term_id);
    std::fs::create_dir_all(&term_dir)?;

    let (mut courses_root, has_courses_dir) = find_courses_root(&term_dir);
    if !has_courses_dir {
        courses_root = term_dir.join(COURSE_DIR_CANONICAL);
        std::fs::create_dir_all(&courses_root)?;
    }

    let stem = sanitize_stem(&sigla);
    let md_path = courses_root.join(format!("{stem}.md"));

    // the resolved destination must stay inside the term directory
    let term_canon = term_dir.canonicalize()?;
    let parent_canon = md_path
        .parent()
        .ok_or_else(|| AppError::PathSafety(sigla.clone()))?
        .canonicalize()?;
    if !parent_canon.starts_with(&term_canon) {
        return Err(AppError::PathSafety(sigla.clone()));
    }

    let fm_value = Value::Object(fm);
    let fm_text = match serde_yaml::to_string(&fm_value) {
        Ok(text) => text,
        Err(_) => serde_json::to_string_pretty(&fm_value)?,
    };

    let body = format!("---\n{fm_text}\n---\n\n{NOTE_BODY}\n");
    std::fs::write(&md_path, body)?;

    let file_rel = rel(&md_path, base);
    info!("materialized course file: {}", file_rel);
    Ok(file_rel)
}
