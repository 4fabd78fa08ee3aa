use std::env;
use std::path::PathBuf;

pub const APP_NAME: &str = "malla-server";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Accepted course-subfolder names inside a term folder. The leading-comma
/// variant sorts first in Obsidian vaults and is checked first.
pub const COURSE_DIR_ALIASES: [&str; 2] = [",Cursos", "Cursos"];
/// Name used when the materializer has to create the subfolder itself.
pub const COURSE_DIR_CANONICAL: &str = "Cursos";

pub const COURSE_FILE_EXT: &str = "md";
pub const DRAFT_FILE: &str = "malla_draft.json";
pub const UI_DIRNAME: &str = "mallas_app";

pub const MAX_CREDITS: u32 = 65;
pub const SOFT_CREDITS: u32 = 50;

/// Recursive term discovery gives up below this depth (relative to base).
pub const MAX_SCAN_DEPTH: usize = 5;

pub const DEFAULT_CATEGORY: &str = "ex";

pub const DEFAULT_PORT_START: u16 = 8787;
pub const PORT_ATTEMPTS: u16 = 80;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub base_dir: PathBuf,
    pub port_start: u16,
}

impl ServerConfig {
    /// Build from the environment. `MALLA_BASE_DIR` overrides the scanned
    /// directory (default: current working directory), `MALLA_PORT` the
    /// start of the probed port range.
    pub fn new_from_env() -> Result<Self, std::io::Error> {
        let base_dir = match env::var("MALLA_BASE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => env::current_dir()?,
        };
        let port_start = env::var("MALLA_PORT")
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT_START);

        Ok(Self {
            base_dir,
            port_start,
        })
    }
}
