use std::fs;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use malla_server::api::router;
use malla_server::state::AppState;

fn app(base: &Path) -> Router {
    router(AppState::new(base.to_path_buf(), None))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn config_endpoint_reports_static_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, body) = get(app(tmp.path()), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_credits"], json!(65));
    assert_eq!(body["soft_credits"], json!(50));
    assert_eq!(body["term_code_by_sem"], json!({"0": "V", "1": "I", "2": "P"}));
    assert_eq!(body["theme_values"], json!(["light", "dark"]));
}

#[tokio::test]
async fn full_catalog_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let course = tmp.path().join("2024-1/Cursos/MAT101.md");
    fs::create_dir_all(course.parent().unwrap()).unwrap();
    fs::write(&course, "---\nsigla: MAT101\ncréditos: 10\naprobado: true\n---\n").unwrap();

    let (status, body) = get(app(tmp.path()), "/api/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["debug"]["mode"], json!("direct"));
    assert_eq!(body["terms"][0]["term_id"], json!("2024-1"));
    assert_eq!(body["terms"][0]["code"], json!("I"));
    assert_eq!(body["courses"][0]["creditos"], json!(10));
    assert_eq!(body["courses"][0]["aprobado"], json!(true));
}

#[tokio::test]
async fn draft_save_sanitizes_and_round_trips() {
    let tmp = tempfile::tempdir().unwrap();

    // a non-object body is accepted and persisted as the empty default
    let (status, body) = post_json(app(tmp.path()), "/api/draft", json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = get(app(tmp.path()), "/api/draft").await;
    assert_eq!(body["term_order"], json!([]));
    assert_eq!(body["temp_courses"], json!([]));

    let draft = json!({
        "term_order": ["2024-1"],
        "placements": {"c": "2024-1"},
        "temp_courses": [{"sigla": "TMP1"}, "basura"],
    });
    post_json(app(tmp.path()), "/api/draft", draft).await;
    let (_, body) = get(app(tmp.path()), "/api/draft").await;
    assert_eq!(body["term_order"], json!(["2024-1"]));
    assert_eq!(body["temp_courses"], json!([{"sigla": "TMP1"}]));
}

#[tokio::test]
async fn draft_reset_deletes_the_overlay_file() {
    let tmp = tempfile::tempdir().unwrap();
    post_json(app(tmp.path()), "/api/draft", json!({"term_order": ["2024-1"]})).await;

    let (status, body) = post_json(app(tmp.path()), "/api/draft/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "deleted": true}));

    let (_, body) = post_json(app(tmp.path()), "/api/draft/reset", json!({})).await;
    assert_eq!(body["deleted"], json!(false));
}

#[tokio::test]
async fn materialize_creates_file_and_reports_rel_path() {
    let tmp = tempfile::tempdir().unwrap();
    let payload = json!({"term_id": "2025-2", "sigla": "FIS200", "creditos": 8});
    let (status, body) = post_json(app(tmp.path()), "/api/materialize", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["fileRel"], json!("2025-2/Cursos/FIS200.md"));
    assert!(tmp.path().join("2025-2/Cursos/FIS200.md").is_file());
}

#[tokio::test]
async fn materialize_errors_are_structured_json() {
    let tmp = tempfile::tempdir().unwrap();

    let (status, body) =
        post_json(app(tmp.path()), "/api/materialize", json!({"term_id": "nope", "sigla": "X"}))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("term_id"));

    let payload = json!({"term_id": "2024-1", "sigla": "../../etc/passed"});
    let (status, body) = post_json(app(tmp.path()), "/api/materialize", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn missing_ui_dir_serves_fallback_index() {
    let tmp = tempfile::tempdir().unwrap();

    let res = app(tmp.path())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("mallas_app"));

    let res = app(tmp.path())
        .oneshot(Request::builder().uri("/otra").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app(tmp.path())
        .oneshot(Request::builder().uri("/favicon.ico").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
