//! Static file server: three roots tried in order, no other routes.

use crate::config::SiteConfig;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const JAVASCRIPT_MIME: &str = "application/javascript";

/// Forces the JavaScript MIME type for every `*.js` path so module scripts load.
async fn javascript_mime(req: Request, next: Next) -> Response {
    let is_js = req.uri().path().ends_with(".js");
    let mut response = next.run(req).await;
    if is_js {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JAVASCRIPT_MIME));
    }
    response
}

pub fn router(config: &SiteConfig) -> Router {
    let [includes, public, src] = [
        &config.server.includes_dir,
        &config.server.public_dir,
        &config.server.src_dir,
    ]
    .map(|dir| config.project_root().join(dir));

    // 依序嘗試 includes -> public -> src
    let static_roots = ServeDir::new(includes).fallback(ServeDir::new(public).fallback(ServeDir::new(src)));

    Router::new()
        .fallback_service(static_roots)
        .layer(middleware::from_fn(javascript_mime))
        .layer(TraceLayer::new_for_http())
}

/// Runs the server on an already bound listener until the task is dropped.
pub async fn serve_on(listener: TcpListener, config: &SiteConfig) -> anyhow::Result<()> {
    let app = router(config);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn serve(config: &SiteConfig, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    for root in config.static_root_paths() {
        if !root.is_dir() {
            tracing::warn!("Static root {} does not exist", root.display());
        }
    }
    tracing::info!("Server running at http://localhost:{}", port);

    serve_on(listener, config).await
}
