//! HTTP server for the live directory view.
//!
//! Serves the rendered tree, pushes updates over server-sent events and
//! hands out file downloads from the mirrored root.

use std::convert::Infallible;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::config::Settings;
use crate::mirror::TreeMirror;
use crate::render;
use crate::tree::TreeNode;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    mirror: TreeMirror,
    keep_alive: Duration,
    /// Ends open update streams so graceful shutdown can complete.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(mirror: TreeMirror, keep_alive: Duration, shutdown: CancellationToken) -> Self {
        Self {
            mirror,
            keep_alive,
            shutdown,
        }
    }
}

/// Build the router: index page, SSE updates, JSON snapshot, downloads.
pub fn router(state: AppState) -> Router {
    let downloads = ServeDir::new(state.mirror.root());

    Router::new()
        .route("/", get(index))
        .route("/updates", get(updates))
        .route("/api/tree", get(tree_json))
        .route("/health", get(health_check))
        .nest_service("/download", downloads)
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::render_page(&state.mirror.current()))
}

async fn tree_json(State(state): State<AppState>) -> impl IntoResponse {
    let tree = state.mirror.current();
    Json(TreeNode::clone(&tree))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn updates(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.mirror.subscribe();
    crate::debug_event!("server", "sse connected", "#{}", subscription.id());

    // The subscription lives inside the stream; dropping the stream on
    // disconnect unsubscribes.
    let stream = futures::stream::unfold(
        (subscription, state.mirror.clone(), state.shutdown.clone()),
        |(mut subscription, mirror, shutdown)| async move {
            tokio::select! {
                changed = subscription.changed() => {
                    if !changed {
                        return None;
                    }
                }
                _ = shutdown.cancelled() => return None,
            }
            let html = render::render_tree(&mirror.current());
            let event = Event::default().event("update").data(html);
            Some((Ok::<_, Infallible>(event), (subscription, mirror, shutdown)))
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

/// Run the server until Ctrl+C.
pub async fn serve(config: Settings) -> anyhow::Result<()> {
    crate::log_event!(
        "server",
        "starting",
        "{} on {}",
        config.root.display(),
        config.server.bind
    );

    let mirror = TreeMirror::open(&config.root)?;
    let adapter = mirror.watch(config.watch.channel_capacity)?;

    let ct = CancellationToken::new();

    let watch_mirror = mirror.clone();
    let watch_ct = ct.clone();
    let watch_task = tokio::spawn(async move {
        tokio::select! {
            _ = watch_mirror.run(adapter) => {
                crate::log_event!("watcher", "ended");
            }
            _ = watch_ct.cancelled() => {
                crate::log_event!("watcher", "stopped");
            }
        }
    });

    let state = AppState::new(
        mirror.clone(),
        Duration::from_secs(config.server.sse_keep_alive_secs.max(1)),
        ct.clone(),
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    let local = listener.local_addr()?;
    eprintln!("Serving {} on http://{local}", mirror.root().display());
    eprintln!("Press Ctrl+C to stop the server");

    let shutdown_ct = ct.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_ct.cancel();
        })
        .await?;

    ct.cancel();
    let _ = watch_task.await;
    eprintln!("HTTP server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl+c: {e}");
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    eprintln!("Received shutdown signal");
}
