mod app;
mod auth;
mod config;
mod error;
mod events;
mod middleware;
mod pages;
mod state;
mod views;

use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "eventbook=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    let session_store = PostgresStore::new(app_state.db.clone());
    session_store.migrate().await?;

    // Sweep expired session rows in the background.
    let sweep_store = session_store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            if let Err(e) = sweep_store.delete_expired().await {
                tracing::error!(error = %e, "session expiry sweep failed");
            }
        }
    });

    let port = app_state.config.port;
    let app = app::build_app(app_state, session_store);
    app::serve(app, port).await
}
