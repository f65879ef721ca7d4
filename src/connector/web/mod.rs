//! Browser-facing chat surface.
//!
//! Each visitor gets a [`ChatSession`](crate::application::ChatSession)
//! addressed by a UUID in the URL. The page is server-rendered; every form
//! post mutates the session and redirects back to the page.

mod error;
mod handlers;
mod page;
mod session_store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::routing::{get, post};
use tracing::{info, warn};

use crate::connector::api::Container;

pub use error::WebError;
pub use handlers::{ConnectForm, MessageForm};
pub use page::PageRenderer;
pub use session_store::{SessionStore, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_SESSIONS};

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state handed to every handler.
pub struct AppState {
    pub container: Arc<Container>,
    pub sessions: SessionStore,
    pub renderer: PageRenderer,
}

impl AppState {
    pub fn new(container: Arc<Container>, sessions: SessionStore) -> Result<Self> {
        Ok(Self {
            container,
            sessions,
            renderer: PageRenderer::new()?,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/sessions/{id}", get(handlers::show_session))
        .route("/sessions/{id}/connect", post(handlers::connect))
        .route(
            "/sessions/{id}/messages",
            get(handlers::list_messages).post(handlers::post_message),
        )
        .route("/sessions/{id}/end", post(handlers::end_session))
        .with_state(state)
}

/// Bind `addr` and serve the chat UI until Ctrl-C or SIGTERM.
pub async fn serve(container: Arc<Container>, addr: &str, sessions: SessionStore) -> Result<()> {
    let state = Arc::new(AppState::new(container, sessions)?);
    spawn_session_sweeper(Arc::clone(&state));
    let app = build_router(state);

    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Chat server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat server stopped");
    Ok(())
}

/// Periodically drop idle sessions so abandoned tabs release their pools.
fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = state
        .sessions
        .idle_timeout()
        .min(MAX_SWEEP_INTERVAL)
        .max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = state.sessions.evict_idle().await;
            if evicted > 0 {
                info!("Dropped {} idle chat session(s)", evicted);
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
