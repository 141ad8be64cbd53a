//! Development server with live reload
//!
//! Pages are rendered on request from the current index snapshot. The file
//! watcher runs on its own thread and only ever swaps in a freshly built
//! index, so a request sees either the old index or the new one.

pub mod watcher;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{IndexCache, Snapshot};
use crate::content::MarkdownRenderer;
use crate::seo::sitemap;
use crate::templates::TemplateRenderer;
use crate::Site;

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
pub struct ServerState {
    site: Site,
    cache: Arc<IndexCache>,
    markdown: MarkdownRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(site: &Site, cache: Arc<IndexCache>, live_reload: bool) -> Self {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Self {
            markdown: MarkdownRenderer::new(&site.config.highlight),
            site: site.clone(),
            cache,
            reload_tx,
            live_reload,
        }
    }

    fn templates(&self) -> TemplateRenderer<'_> {
        TemplateRenderer::new(&self.site.config, Local::now().date_naive())
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, Response> {
        self.cache.get().map_err(|e| {
            tracing::error!("Failed to build index: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to build index: {}", e),
            )
                .into_response()
        })
    }

    fn page(&self, status: StatusCode, html: String) -> Response {
        let html = if self.live_reload {
            inject_live_reload(&html)
        } else {
            html
        };
        (status, Html(html)).into_response()
    }

    fn not_found(&self, path: &str) -> Response {
        let html = self.templates().not_found(path);
        self.page(StatusCode::NOT_FOUND, html)
    }
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool) -> Result<()> {
    let cache = Arc::new(site.index_cache());

    // Build once up front so the first request does not pay for it and a
    // broken content directory is reported before binding
    cache
        .get()
        .with_context(|| format!("Failed to index {:?}", site.content_dir))?;

    let state = Arc::new(ServerState::new(site, Arc::clone(&cache), watch));
    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Live reload enabled. Watching for changes...");
        spawn_watcher(site.clone(), cache, state.reload_tx.clone());
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes for the rendered site
pub fn router(state: Arc<ServerState>) -> Router {
    let blog_root = state.site.config.blog_root();

    let mut app = Router::new()
        .route("/", get(listing_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/__livereload", get(livereload_handler))
        .route(&format!("{}/:slug", blog_root), get(post_handler));

    if !blog_root.is_empty() {
        app = app
            .route(&blog_root, get(listing_handler))
            .route(&format!("{}/", blog_root), get(listing_handler));
    }

    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reload the index on every relevant change and tell the browsers
fn spawn_watcher(site: Site, cache: Arc<IndexCache>, reload_tx: broadcast::Sender<()>) {
    std::thread::spawn(move || {
        let config_path = canonical(&site.config_path());
        let result = watcher::watch(&site, |changed| {
            reload_on_change(&config_path, &cache, &reload_tx, changed);
        });

        if let Err(e) = result {
            tracing::error!("File watcher error: {}", e);
        }
    });
}

/// Swap in a fresh index after a batch of changes; returns whether it did
fn reload_on_change(
    config_path: &std::path::Path,
    cache: &IndexCache,
    reload_tx: &broadcast::Sender<()>,
    changed: &[PathBuf],
) -> bool {
    if changed.iter().any(|p| canonical(p) == config_path) {
        tracing::warn!("Config changes take effect after a restart");
    }

    match cache.reload() {
        Ok(_) => {
            // Notify all connected clients to reload
            let _ = reload_tx.send(());
            true
        }
        Err(e) => {
            tracing::error!("Reload failed, keeping the previous index: {}", e);
            false
        }
    }
}

/// Absolute form of a path, as the watcher reports it
fn canonical(path: &std::path::Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn listing_handler(State(state): State<Arc<ServerState>>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let html = state.templates().listing(&snapshot.listing());
    state.page(StatusCode::OK, html)
}

/// A post page; unknown slugs fall through to `static/` and then the 404 page
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    request: Request<Body>,
) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    match snapshot.find(&slug) {
        Ok(post) => {
            let (newer, older) = snapshot.neighbours(&slug);
            let body = state.markdown.render(&post.content);
            let html = state.templates().post(post, &body, newer, older);
            state.page(StatusCode::OK, html)
        }
        Err(e) => {
            tracing::debug!("{}", e);
            fallback_handler(State(state), request).await
        }
    }
}

async fn sitemap_handler(State(state): State<Arc<ServerState>>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let entries = sitemap::entries(
        snapshot.index(),
        &state.site.config,
        Local::now().date_naive(),
    );
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap::to_xml(&entries),
    )
        .into_response()
}

async fn robots_handler(State(state): State<Arc<ServerState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::robots_txt(&state.site.config),
    )
        .into_response()
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
            // Wait for reload signal
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
            // Handle incoming messages (ping/pong)
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

/// Serve files from `static/`, with the 404 page for anything missing
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    let mut service = ServeDir::new(&state.site.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => state.not_found(&path),
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn state(dir: &std::path::Path, live_reload: bool) -> Arc<ServerState> {
        let site = Site::new(dir).unwrap();
        fs::create_dir_all(&site.content_dir).unwrap();
        fs::write(
            site.content_dir.join("hello.mdx"),
            "---\ntitle: Hello\npublishedAt: 2024-06-01\n---\nSome *text*\n",
        )
        .unwrap();

        let cache = Arc::new(site.index_cache());
        Arc::new(ServerState::new(&site, cache, live_reload))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_page() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);

        let response =
            post_handler(State(state), Path("hello".to_string()), get("/blog/hello")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<em>text</em>"));
        assert!(!body.contains("__livereload"));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), true);

        let response =
            post_handler(State(state), Path("nope".to_string()), get("/blog/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("404 - Page Not Found"));
        assert!(body.contains("/__livereload"));
    }

    #[tokio::test]
    async fn test_listing_sees_reloaded_index() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);

        let body = body_text(listing_handler(State(Arc::clone(&state))).await).await;
        assert!(body.contains("href=\"/blog/hello\""));
        assert!(!body.contains("href=\"/blog/second\""));

        fs::write(
            state.site.content_dir.join("second.md"),
            "---\ntitle: Second\npublishedAt: 2024-07-01\n---\n",
        )
        .unwrap();
        state.cache.reload().unwrap();

        let body = body_text(listing_handler(State(state)).await).await;
        let second = body.find("href=\"/blog/second\"").unwrap();
        let hello = body.find("href=\"/blog/hello\"").unwrap();
        assert!(second < hello);
    }

    #[tokio::test]
    async fn test_sitemap_and_robots() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);

        let response = sitemap_handler(State(Arc::clone(&state))).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml; charset=utf-8"
        );
        let body = body_text(response).await;
        assert!(body.contains("/blog/hello</loc>\n    <lastmod>2024-06-01</lastmod>"));

        let body = body_text(robots_handler(State(state)).await).await;
        assert!(body.starts_with("User-agent: *"));
    }

    #[tokio::test]
    async fn test_root_blog_path_still_serves_static_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "blog_path: /\n").unwrap();
        let state = state(dir.path(), false);
        fs::create_dir_all(&state.site.static_dir).unwrap();
        fs::write(state.site.static_dir.join("style.css"), "body {}").unwrap();

        let app = router(Arc::clone(&state));

        let response = app.clone().oneshot(get("/style.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body {}");

        let response = app.clone().oneshot(get("/hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<em>text</em>"));

        let response = app.oneshot(get("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("404 - Page Not Found"));
    }

    #[tokio::test]
    async fn test_static_fallback_under_blog_path() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);
        fs::create_dir_all(state.site.static_dir.join("blog")).unwrap();
        fs::write(state.site.static_dir.join("blog/cover.png"), "png").unwrap();

        let app = router(state);
        let response = app.clone().oneshot(get("/blog/cover.png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/blog/hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_change_under_hidden_parent_reloads_index() {
        // The whole site lives under a hidden directory
        let dir = tempfile::Builder::new().prefix(".sites").tempdir().unwrap();
        let state = state(dir.path(), false);
        let cache = &state.cache;
        assert_eq!(cache.get().unwrap().len(), 1);

        let mut reload_rx = state.reload_tx.subscribe();
        let new_post = state.site.content_dir.join("second.md");
        fs::write(&new_post, "---\ntitle: Second\npublishedAt: 2024-07-01\n---\n").unwrap();

        let roots = watcher::watch_roots(&state.site);
        let changed = watcher::relevant_changes(&roots, vec![canonical(&new_post)]);
        assert_eq!(changed.len(), 1);

        let config_path = canonical(&state.site.config_path());
        assert!(reload_on_change(&config_path, cache, &state.reload_tx, &changed));
        assert_eq!(cache.get().unwrap().routes(), vec!["hello", "second"]);
        assert!(reload_rx.try_recv().is_ok());
    }

    #[test]
    fn test_failed_reload_keeps_index_and_stays_quiet() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);
        let before = state.cache.get().unwrap();

        let mut reload_rx = state.reload_tx.subscribe();
        let duplicate = state.site.content_dir.join("hello.md");
        fs::write(&duplicate, "---\ntitle: Again\n---\n").unwrap();

        let config_path = canonical(&state.site.config_path());
        assert!(!reload_on_change(
            &config_path,
            &state.cache,
            &state.reload_tx,
            &[duplicate]
        ));
        assert!(Arc::ptr_eq(&before, &state.cache.get().unwrap()));
        assert!(reload_rx.try_recv().is_err());
    }

    #[test]
    fn test_config_change_matches_through_relative_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Notes\n").unwrap();

        // A non-canonical base directory, like a relative `--cwd`
        let site = Site::new(dir.path().join("posts").join("..")).unwrap();
        let reported = fs::canonicalize(dir.path().join("_config.yml")).unwrap();

        assert_ne!(site.config_path(), reported);
        assert_eq!(canonical(&site.config_path()), reported);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>hi</body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));
        assert!(inject_live_reload("bare").starts_with("bare"));
    }
}
