use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub base_dir: PathBuf,
    pub ui_dir: Option<PathBuf>,
    /// Serializes the catalog scan and every filesystem-mutating operation
    /// (draft save, draft reset, materialize). No request may observe a
    /// half-written draft or a half-created course file.
    pub fs_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(base_dir: PathBuf, ui_dir: Option<PathBuf>) -> Self {
        Self {
            base_dir,
            ui_dir,
            fs_lock: Arc::new(Mutex::new(())),
        }
    }
}
