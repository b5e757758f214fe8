//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::routes::{normalize_path, Redirect, SitePlan};
use crate::{Site, CONFIG_FILE};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    /// Path prefix stripped from request paths
    prefix: String,
    /// Replaced after every successful rebuild
    redirects: RwLock<Vec<Redirect>>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn redirect_for(&self, path: &str) -> Option<Redirect> {
        let path = normalize_path(path);
        let redirects = self.redirects.read().ok()?;
        redirects.iter().find(|r| r.from == path).cloned()
    }
}

/// Start the development server for an already generated site
pub async fn start(
    site: &Site,
    plan: SitePlan,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: site.public_dir.clone(),
        prefix: site.config.prefix().to_string(),
        redirects: RwLock::new(plan.redirects),
        reload_tx,
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}/", ip, port, state.prefix);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let site = site.clone();
        let state = state.clone();
        // The debouncer delivers events over a blocking channel
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(site, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch for file changes, rebuild and trigger reload
fn watch_and_reload(site: Site, state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let config_path = site.base_dir.join(CONFIG_FILE);
    for (path, mode) in [
        (&site.content_dir, RecursiveMode::Recursive),
        (&site.static_dir, RecursiveMode::Recursive),
        (&config_path, RecursiveMode::NonRecursive),
    ] {
        if path.exists() {
            debouncer.watcher().watch(path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant_events: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path))
                    .collect();

                if relevant_events.is_empty() {
                    continue;
                }

                for event in &relevant_events {
                    tracing::info!("File changed: {}", event.path.display());
                }

                tracing::info!("Regenerating...");
                match Site::new(&site.base_dir).and_then(|site| site.generate()) {
                    Ok(plan) => {
                        if let Ok(mut redirects) = state.redirects.write() {
                            *redirects = plan.redirects;
                        }
                        tracing::info!("Regenerated successfully");
                        // Notify all connected clients to reload
                        let _ = state.reload_tx.send(());
                    }
                    Err(e) => {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor backups and VCS internals never trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve redirects, then files, injecting the live reload script into HTML
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let Some(path) = strip_prefix(request.uri().path(), &state.prefix) else {
        return not_found(&state).await;
    };

    if let Some(redirect) = state.redirect_for(&path) {
        let location = format!("{}{}", state.prefix, redirect.to);
        tracing::debug!("{} {} -> {}", redirect.status_code(), path, location);
        return redirect_response(&redirect, &location);
    }

    let Some(file_path) = resolve_file(&state.public_dir, &path) else {
        return not_found(&state).await;
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) if state.live_reload => Html(inject_live_reload(&content)).into_response(),
            Ok(content) => Html(content).into_response(),
            Err(_) => not_found(&state).await,
        }
    } else {
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        let (mut parts, body) = request.into_parts();
        if let Ok(uri) = path.parse::<axum::http::Uri>() {
            parts.uri = uri;
        }
        match service.try_call(Request::from_parts(parts, body)).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Request path relative to the site root, `None` outside the prefix
fn strip_prefix(path: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return Some(path.to_string());
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(format!("/{}", rest.trim_start_matches('/')))
    } else {
        None
    }
}

/// Map a request path to a file in the public directory
fn resolve_file(public_dir: &Path, path: &str) -> Option<PathBuf> {
    let clean_path = path.trim_start_matches('/');
    if clean_path.split('/').any(|segment| segment == "..") {
        return None;
    }

    let candidate = public_dir.join(clean_path);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.exists().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }

    let with_html = public_dir.join(format!("{}.html", clean_path.trim_end_matches('/')));
    with_html.is_file().then_some(with_html)
}

fn redirect_response(redirect: &Redirect, location: &str) -> Response {
    let status = if redirect.permanent {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };
    (status, [(header::LOCATION, location.to_string())]).into_response()
}

/// The generated 404 page with a 404 status
async fn not_found(state: &ServerState) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(content) => {
            let content = if state.live_reload {
                inject_live_reload(&content)
            } else {
                content
            };
            (StatusCode::NOT_FOUND, Html(content)).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state(redirects: Vec<Redirect>) -> ServerState {
        ServerState {
            public_dir: PathBuf::from("public"),
            prefix: String::new(),
            redirects: RwLock::new(redirects),
            reload_tx: broadcast::channel(1).0,
            live_reload: false,
        }
    }

    #[test]
    fn test_redirect_lookup_ignores_trailing_slash() {
        let state = state(vec![Redirect {
            from: "/old".to_string(),
            to: "/blog/new".to_string(),
            permanent: true,
            redirect_in_browser: true,
        }]);
        assert_eq!(state.redirect_for("/old/").unwrap().to, "/blog/new");
        assert!(state.redirect_for("/other").is_none());
    }

    #[test]
    fn test_redirect_status() {
        let mut redirect = Redirect {
            from: "/".to_string(),
            to: "/blog".to_string(),
            permanent: false,
            redirect_in_browser: false,
        };
        let response = redirect_response(&redirect, "/blog");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/blog");

        redirect.permanent = true;
        let response = redirect_response(&redirect, "/blog");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("/blog/x", "").as_deref(), Some("/blog/x"));
        assert_eq!(strip_prefix("/site/blog", "/site").as_deref(), Some("/blog"));
        assert_eq!(strip_prefix("/site", "/site").as_deref(), Some("/"));
        assert_eq!(strip_prefix("/sitemap", "/site"), None);
        assert_eq!(strip_prefix("/other", "/site"), None);
    }

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog/post")).unwrap();
        fs::write(dir.path().join("blog/post/index.html"), "post").unwrap();
        fs::write(dir.path().join("404.html"), "missing").unwrap();

        assert_eq!(
            resolve_file(dir.path(), "/blog/post/"),
            Some(dir.path().join("blog/post/index.html"))
        );
        assert_eq!(
            resolve_file(dir.path(), "/404"),
            Some(dir.path().join("404.html"))
        );
        assert_eq!(resolve_file(dir.path(), "/nope"), None);
        assert_eq!(resolve_file(dir.path(), "/../secret"), None);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>hi</body></html>");
        assert!(html.contains("__livereload"));
        assert!(html.ends_with("</html>"));
    }
}
