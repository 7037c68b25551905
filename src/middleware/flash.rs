//! One-time notification messages carried in the session.
//!
//! A flash pushed during one request is drained by [`load_flash`] on the
//! next request and handed to the view layer through the [`Alerts`]
//! extension, so it renders exactly once.

use axum::{extract::Request, middleware::Next, response::Response};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppResult;

const FLASH_KEY: &str = "_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Drained flash messages for the current request's render.
#[derive(Debug, Clone, Default)]
pub struct Alerts(pub Vec<Flash>);

/// Queue a message for the next rendered page.
pub async fn push(session: &Session, kind: FlashKind, message: impl Into<String>) -> AppResult<()> {
    let mut queue: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queue.push(Flash {
        kind,
        message: message.into(),
    });
    session.insert(FLASH_KEY, queue).await?;
    Ok(())
}

/// Remove and return all queued messages.
pub async fn take(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session.remove::<Vec<Flash>>(FLASH_KEY).await?.unwrap_or_default())
}

/// Middleware: drain the session flash queue into an [`Alerts`] extension.
/// Must run after the session layer and before any handler that renders.
pub async fn load_flash(session: Session, mut req: Request, next: Next) -> AppResult<Response> {
    let alerts = take(&session).await?;
    req.extensions_mut().insert(Alerts(alerts));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn take_drains_the_queue() {
        let session = test_session();
        push(&session, FlashKind::Error, "Invalid email or password.")
            .await
            .unwrap();
        push(&session, FlashKind::Info, "Welcome back!").await.unwrap();

        let first = take(&session).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, FlashKind::Error);
        assert_eq!(first[0].message, "Invalid email or password.");

        // Read-once: a second take sees nothing.
        let second = take(&session).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn take_on_empty_session_is_empty() {
        let session = test_session();
        assert!(take(&session).await.unwrap().is_empty());
    }
}
