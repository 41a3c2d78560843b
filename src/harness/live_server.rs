use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;

struct StaticRoot(PathBuf);

/// Static-file HTTP server on an ephemeral local port for the browser to load
pub struct LiveServer {
    url: Url,
    handle: ServerHandle,
    task: JoinHandle<std::io::Result<()>>,
}

impl LiveServer {
    /// Serves the files under `static_root` on `127.0.0.1` at a free port
    pub async fn start(static_root: impl Into<PathBuf>) -> Result<Self> {
        let root = web::Data::new(StaticRoot(static_root.into()));
        debug!("Starting live server for {}", root.0.display());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(root.clone())
                .default_service(web::to(serve_static))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .context("Failed to bind live server")?;

        let addr: SocketAddr = server
            .addrs()
            .first()
            .copied()
            .context("Live server has no bound address")?;
        let url = Url::parse(&format!("http://{}/", addr))?;

        let server = server.run();
        let handle = server.handle();
        let task = tokio::spawn(server);

        info!("Live server listening on {}", url);
        Ok(Self { url, handle, task })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Absolute URL of `path` on this server
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid live server path: {}", path))
    }

    pub async fn stop(self) {
        debug!("Stopping live server on {}", self.url);
        self.handle.stop(true).await;
        match self.task.await {
            Ok(Ok(())) => trace!("Live server stopped"),
            Ok(Err(e)) => warn!("Live server exited with error: {}", e),
            Err(e) => warn!("Live server task failed: {}", e),
        }
    }
}

async fn serve_static(req: HttpRequest, root: web::Data<StaticRoot>) -> HttpResponse {
    let relative = req.path().trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };

    if relative.split('/').any(|segment| segment == ".." || segment.eq_ignore_ascii_case("%2e%2e")) {
        warn!("Rejected path outside static root: {}", req.path());
        return HttpResponse::Forbidden().finish();
    }

    let path = root.0.join(relative);
    match tokio::fs::read(&path).await {
        Ok(body) => {
            trace!("Serving {} ({} bytes)", path.display(), body.len());
            HttpResponse::Ok()
                .content_type(content_type_for(&path))
                .body(body)
        }
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
