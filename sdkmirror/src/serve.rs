//! Static HTTP server re-exposing a mirror directory.
//!
//! Files under the output directory are served at
//! `/android/repository/<relative path>`, the same layout the upstream host
//! uses, so an SDK client only needs its manifest URLs rewritten to point at
//! this machine.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::fs::File;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_MANIFEST_URLS, SERVE_PREFIX};
use crate::error::{MirrorError, MirrorResult};

/// Default port for `serve`.
pub const DEFAULT_PORT: u16 = 8080;

/// Build the router serving files below `root`.
pub fn router(root: PathBuf) -> Router {
    Router::new()
        .route(&format!("{}*path", SERVE_PREFIX), get(serve_file))
        .with_state(Arc::new(root))
}

/// Serve `root` on all interfaces until the process is stopped.
pub async fn serve(root: PathBuf, port: u16) -> MirrorResult<()> {
    if !root.is_dir() {
        return Err(MirrorError::InvalidPath(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| MirrorError::Serve(format!("cannot bind {}: {}", addr, e)))?;

    tracing::info!(root = %root.display(), %addr, "Serving mirror");

    axum::serve(listener, router(root))
        .await
        .map_err(|e| MirrorError::Serve(e.to_string()))
}

/// Run [`serve`] on a fresh tokio runtime, blocking the calling thread.
pub fn serve_blocking(root: PathBuf, port: u16) -> MirrorResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| MirrorError::Serve(format!("cannot start runtime: {}", e)))?;

    runtime.block_on(serve(root, port))
}

/// Map a request path onto a file below `root`.
///
/// Returns `None` for empty paths and for anything that is not a plain
/// relative path (`..`, absolute or prefixed components).
pub fn resolve_path(root: &FsPath, request_path: &str) -> Option<PathBuf> {
    let relative = FsPath::new(request_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

/// Address other machines on the network can reach this host at.
///
/// Connecting a UDP socket sends nothing; it only selects the outbound
/// interface.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// The default manifest URLs rewritten to point at `host` (`ip:port`).
pub fn mirror_urls(host: &str) -> Vec<String> {
    let local_base = format!("http://{}{}", host, SERVE_PREFIX);
    DEFAULT_MANIFEST_URLS
        .iter()
        .map(|url| url.replacen(DEFAULT_BASE_URL, &local_base, 1))
        .collect()
}

fn content_type(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}

/// GET /android/repository/*path
async fn serve_file(State(root): State<Arc<PathBuf>>, Path(path): Path<String>) -> Response {
    let Some(file_path) = resolve_path(&root, &path) else {
        tracing::debug!(path = %path, "Rejected request path");
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let file = match File::open(&file_path).await {
        Ok(file) => file,
        Err(_) => return (StatusCode::NOT_FOUND, "not found").into_response(),
    };
    let length = match file.metadata().await {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        _ => return (StatusCode::NOT_FOUND, "not found").into_response(),
    };

    tracing::debug!(path = %file_path.display(), bytes = length, "Serving file");

    (
        [
            (header::CONTENT_TYPE, content_type(&file_path).to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}
