use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use tracing::instrument;

use crate::error::AppResult;
use crate::events::repo::Event;
use crate::middleware::auth::{require_login, CurrentUser};
use crate::middleware::flash::Alerts;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/resources", get(resources))
        .route(
            "/profile",
            get(profile).route_layer(axum::middleware::from_fn(require_login)),
        )
}

pub async fn index(
    current_user: Option<Extension<CurrentUser>>,
    Extension(Alerts(alerts)): Extension<Alerts>,
) -> Response {
    let user = current_user.as_ref().map(|Extension(CurrentUser(u))| u);
    views::index(user, &alerts).into_response()
}

pub async fn resources(
    current_user: Option<Extension<CurrentUser>>,
    Extension(Alerts(alerts)): Extension<Alerts>,
) -> Response {
    let user = current_user.as_ref().map(|Extension(CurrentUser(u))| u);
    views::resources(user, &alerts).into_response()
}

/// The profile lists only events owned by the session principal; the owner
/// filter is applied in the query, never taken from the client.
#[instrument(skip(state, user, alerts))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(Alerts(alerts)): Extension<Alerts>,
) -> AppResult<Response> {
    let events = Event::list_by_owner(&state.db, user.id).await?;
    Ok(views::profile(&user, &alerts, &events).into_response())
}
