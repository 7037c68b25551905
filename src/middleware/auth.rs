use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::repo::User;
use crate::auth::session::current_user_id;
use crate::error::AppResult;
use crate::middleware::flash::{self, FlashKind};
use crate::state::AppState;

/// The authenticated principal, attached to the request once the session
/// has been resolved to a user row.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware: recover the principal from the session and attach it for
/// downstream handlers and views. Must run after the session layer.
pub async fn load_current_user(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(user_id) = current_user_id(&session).await? {
        match User::find_by_id(&state.db, user_id).await? {
            Some(user) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            None => {
                // Stale session pointing at a deleted user; treat as anonymous.
                tracing::warn!(%user_id, "session references unknown user");
                session.flush().await?;
            }
        }
    }
    Ok(next.run(req).await)
}

/// Guard for routes that require an authenticated principal. Anonymous
/// requests are redirected, never shown the protected content.
pub async fn require_login(session: Session, req: Request, next: Next) -> AppResult<Response> {
    if req.extensions().get::<CurrentUser>().is_none() {
        flash::push(
            &session,
            FlashKind::Error,
            "You must be logged in to view that page.",
        )
        .await?;
        return Ok(Redirect::to("/auth/login").into_response());
    }
    Ok(next.run(req).await)
}
