use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::auth::session::{sign_in, sign_out};
use crate::error::AppResult;
use crate::middleware::flash::{self, Alerts, FlashKind};
use crate::state::AppState;
use crate::views;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_form).post(login))
        .route("/auth/signup", get(signup_form).post(signup))
        .route("/auth/logout", get(logout))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn login_form(Extension(Alerts(alerts)): Extension<Alerts>) -> Response {
    views::login_form(&alerts).into_response()
}

pub async fn signup_form(Extension(Alerts(alerts)): Extension<Alerts>) -> Response {
    views::signup_form(&alerts).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.email = form.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &form.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %form.email, "login unknown email");
            return reject_login(&session).await;
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(email = %form.email, user_id = %user.id, "login invalid password");
        return reject_login(&session).await;
    }

    sign_in(&session, user.id).await?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    flash::push(
        &session,
        FlashKind::Success,
        format!("Welcome back, {}!", user.name),
    )
    .await?;
    Ok(Redirect::to("/profile").into_response())
}

async fn reject_login(session: &Session) -> AppResult<Response> {
    flash::push(session, FlashKind::Error, "Invalid email or password.").await?;
    Ok(Redirect::to("/auth/login").into_response())
}

#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(mut form): Form<SignupForm>,
) -> AppResult<Response> {
    form.email = form.email.trim().to_lowercase();
    form.name = form.name.trim().to_string();

    if form.name.is_empty() {
        flash::push(&session, FlashKind::Error, "Name is required.").await?;
        return Ok(Redirect::to("/auth/signup").into_response());
    }
    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "signup invalid email");
        flash::push(&session, FlashKind::Error, "Please enter a valid email address.").await?;
        return Ok(Redirect::to("/auth/signup").into_response());
    }
    if form.password.len() < 8 {
        warn!("signup password too short");
        flash::push(
            &session,
            FlashKind::Error,
            "Password must be at least 8 characters.",
        )
        .await?;
        return Ok(Redirect::to("/auth/signup").into_response());
    }
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "signup email already registered");
        flash::push(&session, FlashKind::Error, "That email is already registered.").await?;
        return Ok(Redirect::to("/auth/signup").into_response());
    }

    let hash = hash_password(&form.password)?;
    // The pre-check above can race a concurrent signup; the unique index
    // on email is the authority.
    let user = match User::create(&state.db, &form.name, &form.email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %form.email, "signup lost race for email");
            flash::push(&session, FlashKind::Error, "That email is already registered.").await?;
            return Ok(Redirect::to("/auth/signup").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    sign_in(&session, user.id).await?;
    info!(user_id = %user.id, email = %user.email, "user signed up");
    flash::push(
        &session,
        FlashKind::Success,
        format!("Welcome, {}! Your account is ready.", user.name),
    )
    .await?;
    Ok(Redirect::to("/profile").into_response())
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> AppResult<Response> {
    sign_out(&session).await?;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    #[test]
    fn detects_unique_violations_from_the_database() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: true }));
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn other_database_errors_are_not_unique_violations() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: false }));
        assert!(!is_unique_violation(&err));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
