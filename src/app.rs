use std::net::SocketAddr;

use axum::{middleware, Router};
use time::Duration;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer, SessionStore};

use crate::middleware::auth::load_current_user;
use crate::middleware::flash::load_flash;
use crate::middleware::rate_limit::limit_auth_paths;
use crate::middleware::security::security_headers;
use crate::state::AppState;
use crate::{auth, events, pages};

/// Compose the full middleware stack and routes. Request-side order is
/// load-bearing: rate limiter, then session load, then flash extraction,
/// then current-user injection, then per-route guards and handlers. Static
/// assets are served outside the session stack; security headers and
/// tracing cover every response.
pub fn build_app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(Key::derive_from(state.config.session_secret.as_bytes()))
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .nest("/events", events::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(middleware::from_fn(load_flash))
        .layer(session_layer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            limit_auth_paths,
        ))
        .fallback_service(ServeDir::new("public"))
        .layer(middleware::from_fn(security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
        .with_state(state)
}

pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        tracing::info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
