use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppResult;

/// Key under which the authenticated user's id is stored in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Establish the session principal. The session id is cycled so a session
/// that existed before login cannot be replayed as an authenticated one.
pub async fn sign_in(session: &Session, user_id: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Destroy the session record server-side.
pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

/// The principal's user id, if the session is authenticated.
pub async fn current_user_id(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(SESSION_USER_ID_KEY).await?)
}
