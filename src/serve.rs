//! `mangashelf serve`: static hosting for the reader site.
//!
//! Routing happens in the URL fragment, so the server only ever sees plain
//! file paths. Unknown paths fall back to `index.html`.

use std::path::Path;

use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cli::ServeArgs;

pub fn router(site: &Path) -> Router {
    let index = site.join("index.html");
    let static_files = ServeDir::new(site).not_found_service(ServeFile::new(index));

    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let index = args.site.join("index.html");
    if !index.is_file() {
        anyhow::bail!("site directory has no index.html: {}", args.site.display());
    }

    let app = router(&args.site);
    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, site = %args.site.display(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("serve")?;
    Ok(())
}
