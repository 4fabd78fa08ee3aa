use std::fs;
use std::path::Path;

use malla_server::services::catalog::discover_all;

fn mkfile(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn discovers_term_and_course_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    mkfile(
        &tmp.path().join("2024-1/Cursos/MAT101.md"),
        "---\nsigla: MAT101\ncréditos: 10\naprobado: true\n---\n\n# Cálculo\n",
    );

    let catalog = discover_all(tmp.path());

    assert_eq!(catalog.terms.len(), 1);
    let term = &catalog.terms[0];
    assert_eq!(term.term_id, "2024-1");
    assert_eq!(term.year, 2024);
    assert_eq!(term.code, "I");
    assert!(term.has_courses_dir);
    assert_eq!(term.search_root_rel, "2024-1/Cursos");

    assert_eq!(catalog.courses.len(), 1);
    let course = &catalog.courses[0];
    assert_eq!(course.course_id, "2024-1/Cursos/MAT101.md");
    assert_eq!(course.term_id, "2024-1");
    assert_eq!(course.code, "MAT101");
    assert_eq!(course.credits, 10);
    assert!(course.passed);
    assert_eq!(course.category, "ex");
    assert!(course.prerequisites.is_empty());
    assert!(course.error.is_none());

    assert_eq!(catalog.report.mode.as_deref(), Some("direct"));
    assert_eq!(catalog.report.md_found_total, 1);
}

#[test]
fn wire_format_keeps_ui_field_names() {
    let tmp = tempfile::tempdir().unwrap();
    mkfile(&tmp.path().join("2025-2/Cursos/FIS200.md"), "---\nsigla: FIS200\n---\n");

    let catalog = discover_all(tmp.path());
    let term = serde_json::to_value(&catalog.terms[0]).unwrap();
    assert_eq!(term["sem"], serde_json::json!(2));
    assert_eq!(term["folderName"], serde_json::json!("2025-2"));
    assert_eq!(term["hasCoursesDir"], serde_json::json!(true));

    let course = serde_json::to_value(&catalog.courses[0]).unwrap();
    assert_eq!(course["sigla"], serde_json::json!("FIS200"));
    assert_eq!(course["creditos"], serde_json::json!(0));
    assert_eq!(course["aprobado"], serde_json::json!(false));
    assert_eq!(course["fileRel"], serde_json::json!("2025-2/Cursos/FIS200.md"));
    // error key is omitted entirely for healthy records
    assert!(course.get("error").is_none());
}

#[test]
fn term_without_courses_subfolder_is_searched_directly() {
    let tmp = tempfile::tempdir().unwrap();
    mkfile(&tmp.path().join("2024-2/IIC2233.md"), "---\ncreditos: 10\n---\n");

    let catalog = discover_all(tmp.path());
    assert_eq!(catalog.terms.len(), 1);
    assert!(!catalog.terms[0].has_courses_dir);
    assert_eq!(catalog.terms[0].search_root_rel, "2024-2");
    assert_eq!(catalog.courses.len(), 1);
    // sigla falls back to the filename stem
    assert_eq!(catalog.courses[0].code, "IIC2233");
}

#[test]
fn every_file_yields_a_record_and_terms_sort_chronologically() {
    let tmp = tempfile::tempdir().unwrap();
    mkfile(&tmp.path().join("2025-1/Cursos/A.md"), "---\nsigla: A\n---\n");
    mkfile(&tmp.path().join("2023-2/Cursos/B.md"), "sin metadatos");
    mkfile(&tmp.path().join("2023-0/Cursos/C.md"), "---\nnunca se cierra\n");

    let catalog = discover_all(tmp.path());
    let ids: Vec<&str> = catalog.terms.iter().map(|t| t.term_id.as_str()).collect();
    assert_eq!(ids, vec!["2023-0", "2023-2", "2025-1"]);
    assert_eq!(catalog.courses.len(), 3);
    assert!(catalog.courses.iter().all(|c| c.error.is_none()));
}
