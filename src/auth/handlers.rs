use axum::{
    extract::{rejection::FormRejection, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ForgotForm, LoginForm, RegisterForm, SessionUser},
        extractors::{require_anonymous, CurrentUser, HOME_PATH, LOGIN_PATH, SESSION_USER_KEY},
        services::{authenticate, register, reset_password},
    },
    error::{AppError, AppResult},
    flash::{self, Notice},
    state::AppState,
    views::{self, PageContext},
};

/// Form pages, hidden from logged-in users.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(show_register))
        .route("/login", get(show_login))
        .route("/forgot", get(show_forgot))
        .route_layer(middleware::from_fn(require_anonymous))
}

/// Form submissions and logout; unguarded.
pub fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/forgot", post(forgot))
        .route("/logout", get(logout))
}

#[instrument(skip_all)]
pub async fn show_register(session: Session, CurrentUser(user): CurrentUser) -> Response {
    let ctx = PageContext::load(&session, user).await;
    views::auth::register(&ctx).into_response()
}

#[instrument(skip_all)]
pub async fn show_login(session: Session, CurrentUser(user): CurrentUser) -> Response {
    let ctx = PageContext::load(&session, user).await;
    views::auth::login(&ctx).into_response()
}

#[instrument(skip_all)]
pub async fn show_forgot(session: Session, CurrentUser(user): CurrentUser) -> Response {
    let ctx = PageContext::load(&session, user).await;
    views::auth::forgot(&ctx).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn register_user(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, "/register").await {
        Ok(form) => form,
        Err(res) => return res,
    };
    let phone = Some(form.phone.as_str());
    match register(
        state.users.as_ref(),
        &form.username,
        &form.email,
        &form.password,
        phone,
    )
    .await
    {
        Ok(_) => {
            let notice = Notice::success("Registration successful. Please log in.");
            flash::redirect_with(&session, notice, LOGIN_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Server error during registration.", "/register")
                .await
        }
    }
}

/// Start a fresh session id for the logged-in identity.
async fn begin_session(session: &Session, user: &SessionUser) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| anyhow::anyhow!("cycle session id: {e}"))?;
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| anyhow::anyhow!("store session user: {e}"))?;
    Ok(())
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, LOGIN_PATH).await {
        Ok(form) => form,
        Err(res) => return res,
    };
    let result = async {
        let user = authenticate(state.users.as_ref(), &form.username, &form.password).await?;
        begin_session(&session, &user).await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => {
            flash::redirect_with(&session, Notice::success("Logged in."), HOME_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Server error during login.", LOGIN_PATH).await
        }
    }
}

#[instrument(skip(state, session, form))]
pub async fn forgot(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<ForgotForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, "/forgot").await {
        Ok(form) => form,
        Err(res) => return res,
    };
    match reset_password(state.users.as_ref(), &form.email, &form.new_password).await {
        Ok(()) => {
            let notice = Notice::success("Password reset. Please log in.");
            flash::redirect_with(&session, notice, LOGIN_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not reset password.", "/forgot").await
        }
    }
}

/// Delete the session record and its cookie.
#[instrument(skip_all)]
pub async fn logout(session: Session, CurrentUser(user): CurrentUser) -> Response {
    if let Err(e) = session.flush().await {
        warn!(error = %e, "session flush failed");
    }
    if let Some(user) = user {
        info!(user_id = %user.id, "user logged out");
    }
    Redirect::to(HOME_PATH).into_response()
}
