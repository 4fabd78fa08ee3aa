use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::config::DRAFT_FILE;
use crate::error::AppError;
use crate::models::Draft;

pub fn draft_path(base: &Path) -> PathBuf {
    base.join(DRAFT_FILE)
}

/// Load the persisted overlay. Any failure (missing file, invalid encoding,
/// malformed JSON, wrong top-level shape) yields the empty default.
pub async fn load(base: &Path) -> Draft {
    let path = draft_path(base);
    let Ok(text) = fs::read_to_string(&path).await else {
        return Draft::default();
    };
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(raw) => Draft::sanitize(raw),
        Err(e) => {
            debug!("draft file unreadable, using default: {}", e);
            Draft::default()
        }
    }
}

/// Persist the overlay: pretty-printed, whole-file replace via a temp file
/// rename so readers never observe a partial document.
pub async fn save(base: &Path, draft: &Draft) -> Result<(), AppError> {
    let path = draft_path(base);
    let json = serde_json::to_string_pretty(draft)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, &path).await?;
    Ok(())
}

/// Delete the persisted overlay file. Returns whether a file was deleted.
pub async fn reset(base: &Path) -> Result<bool, AppError> {
    match fs::remove_file(draft_path(base)).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_loads_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load(tmp.path()).await, Draft::default());
    }

    #[tokio::test]
    async fn garbage_file_loads_default() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(draft_path(tmp.path()), "{no es json").await.unwrap();
        assert_eq!(load(tmp.path()).await, Draft::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let draft = Draft::sanitize(json!({
            "term_order": ["2024-1"],
            "placements": {"c1": "2024-1"},
        }));
        save(tmp.path(), &draft).await.unwrap();
        assert_eq!(load(tmp.path()).await, draft);
        // no temp file left behind
        assert!(!draft_path(tmp.path()).with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn reset_reports_whether_a_file_existed() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!reset(tmp.path()).await.unwrap());
        save(tmp.path(), &Draft::default()).await.unwrap();
        assert!(reset(tmp.path()).await.unwrap());
        assert!(!draft_path(tmp.path()).exists());
    }
}
