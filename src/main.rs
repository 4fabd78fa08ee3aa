use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use malla_server::api::router;
use malla_server::config::{PORT_ATTEMPTS, ServerConfig, UI_DIRNAME};
use malla_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "malla_server=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::new_from_env()?;
    let ui_dir = pick_ui_dir(&config.base_dir);

    info!("base dir: {}", config.base_dir.display());
    match &ui_dir {
        Some(dir) => info!("UI dir: {}", dir.display()),
        None => info!("UI dir: (missing)"),
    }

    let state = AppState::new(config.base_dir.clone(), ui_dir);
    let app = router(state);

    let listener = bind_first_free(config.port_start).await?;
    let addr = listener.local_addr()?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// The UI directory sits next to the base dir, either directly or under
/// `_internal` (packaged layout). A directory with an index.html wins over
/// one that merely exists.
fn pick_ui_dir(base: &Path) -> Option<PathBuf> {
    let candidates = [base.join(UI_DIRNAME), base.join("_internal").join(UI_DIRNAME)];
    for dir in &candidates {
        if dir.join("index.html").is_file() {
            return Some(dir.clone());
        }
    }
    candidates.into_iter().find(|dir| dir.is_dir())
}

async fn bind_first_free(start: u16) -> std::io::Result<tokio::net::TcpListener> {
    for offset in 0..PORT_ATTEMPTS {
        let Some(port) = start.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        if let Ok(listener) = tokio::net::TcpListener::bind(addr).await {
            return Ok(listener);
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AddrInUse,
        "no free port in range",
    ))
}
