use std::collections::BTreeMap;

use axum::Json;
use axum::http::Uri;
use axum::response::{Html, IntoResponse};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use serde_json::Value;
use tower_http::services::ServeDir;

use crate::config::{APP_NAME, APP_VERSION, MAX_CREDITS, SOFT_CREDITS};
use crate::error::AppError;
use crate::models::{Course, Draft, Session, Term};
use crate::services::catalog::{self, ScanReport};
use crate::services::{draft_store, materializer};
use crate::state::AppState;

/// Served when no UI directory exists next to the base dir.
const FALLBACK_INDEX: &str = r#"<!doctype html><html lang="es"><head>
<meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Malla</title>
<style>
body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;margin:18px}
pre{background:#f6f6f6;border:1px solid #ddd;border-radius:10px;padding:10px;white-space:pre-wrap}
</style></head><body>
<h1>Malla</h1>
<p>No se encontró la UI modular en la carpeta <b>mallas_app</b>.</p>
<pre>Ingeniería Civil/
  malla-server
  malla_draft.json (se crea solo)
  mallas_app/
    index.html
    app.js
    styles.css</pre>
</body></html>
"#;

#[derive(Serialize)]
struct ConfigResponse {
    app_name: &'static str,
    app_version: &'static str,
    max_credits: u32,
    soft_credits: u32,
    term_code_by_sem: BTreeMap<u8, &'static str>,
    supports_theme: bool,
    theme_values: [&'static str; 2],
    theme_default: &'static str,
}

#[derive(Serialize)]
struct AllResponse {
    version: &'static str,
    debug: ScanReport,
    terms: Vec<Term>,
    courses: Vec<Course>,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Serialize)]
struct ResetResponse {
    ok: bool,
    deleted: bool,
}

#[derive(Serialize)]
struct MaterializeResponse {
    ok: bool,
    #[serde(rename = "fileRel")]
    file_rel: String,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/config", get(get_config))
        .route("/api/all", get(get_all))
        .route("/api/draft", get(get_draft).post(post_draft))
        .route("/api/draft/reset", post(reset_draft))
        .route("/api/materialize", post(post_materialize))
        .route("/favicon.ico", get(favicon));

    let router = match &state.ui_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api.fallback(fallback_index),
    };
    router.with_state(state)
}

async fn get_config() -> Json<ConfigResponse> {
    let term_code_by_sem = [Session::Summer, Session::First, Session::Second]
        .into_iter()
        .map(|s| (s.number(), s.code()))
        .collect();
    Json(ConfigResponse {
        app_name: APP_NAME,
        app_version: APP_VERSION,
        max_credits: MAX_CREDITS,
        soft_credits: SOFT_CREDITS,
        term_code_by_sem,
        supports_theme: true,
        theme_values: ["light", "dark"],
        theme_default: "light",
    })
}

async fn get_all(State(state): State<AppState>) -> Result<Json<AllResponse>, AppError> {
    let _guard = state.fs_lock.lock().await;
    let base = state.base_dir.clone();
    let catalog = tokio::task::spawn_blocking(move || catalog::discover_all(&base))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(AllResponse {
        version: APP_VERSION,
        debug: catalog.report,
        terms: catalog.terms,
        courses: catalog.courses,
    }))
}

async fn get_draft(State(state): State<AppState>) -> Json<Draft> {
    Json(draft_store::load(&state.base_dir).await)
}

async fn post_draft(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<OkResponse>, AppError> {
    let _guard = state.fs_lock.lock().await;
    let draft = Draft::sanitize(raw);
    draft_store::save(&state.base_dir, &draft).await?;
    Ok(Json(OkResponse { ok: true }))
}

async fn reset_draft(State(state): State<AppState>) -> Result<Json<ResetResponse>, AppError> {
    let _guard = state.fs_lock.lock().await;
    let deleted = draft_store::reset(&state.base_dir).await?;
    Ok(Json(ResetResponse { ok: true, deleted }))
}

async fn post_materialize(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<MaterializeResponse>, AppError> {
    let _guard = state.fs_lock.lock().await;
    let base = state.base_dir.clone();
    let file_rel = tokio::task::spawn_blocking(move || materializer::materialize(&base, payload))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(Json(MaterializeResponse { ok: true, file_rel }))
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback_index(uri: Uri) -> impl IntoResponse {
    match uri.path() {
        "/" | "/index.html" => Html(FALLBACK_INDEX).into_response(),
        _ => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}
