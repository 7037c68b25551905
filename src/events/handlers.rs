use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::repo::Event;
use crate::middleware::auth::CurrentUser;
use crate::middleware::flash::{self, Alerts, FlashKind};
use crate::state::AppState;
use crate::views;

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/new", get(new_event_form))
        .route("/:id", get(show_event))
        .route("/:id/delete", post(delete_event))
}

#[derive(Debug, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[instrument(skip(state, user, alerts))]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(Alerts(alerts)): Extension<Alerts>,
) -> AppResult<Response> {
    let events = Event::list_by_owner(&state.db, user.id).await?;
    Ok(views::events_list(&user, &alerts, &events).into_response())
}

pub async fn new_event_form(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(Alerts(alerts)): Extension<Alerts>,
) -> Response {
    views::event_form(&user, &alerts).into_response()
}

#[instrument(skip(state, session, user, form))]
pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<EventForm>,
) -> AppResult<Response> {
    let title = form.title.trim();
    if title.is_empty() {
        flash::push(&session, FlashKind::Error, "Title is required.").await?;
        return Ok(Redirect::to("/events/new").into_response());
    }

    let event = Event::create(
        &state.db,
        user.id,
        title,
        form.description.as_deref().filter(|s| !s.trim().is_empty()),
        form.location.as_deref().filter(|s| !s.trim().is_empty()),
    )
    .await?;

    info!(event_id = %event.id, user_id = %user.id, "event created");
    flash::push(&session, FlashKind::Success, "Event created.").await?;
    Ok(Redirect::to("/events").into_response())
}

#[instrument(skip(state, user, alerts))]
pub async fn show_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(Alerts(alerts)): Extension<Alerts>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let event = Event::find_owned(&state.db, user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(views::event_detail(&user, &alerts, &event).into_response())
}

#[instrument(skip(state, session, user))]
pub async fn delete_event(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    if !Event::delete_owned(&state.db, user.id, id).await? {
        return Err(AppError::NotFound);
    }
    info!(event_id = %id, user_id = %user.id, "event deleted");
    flash::push(&session, FlashKind::Success, "Event deleted.").await?;
    Ok(Redirect::to("/events").into_response())
}
