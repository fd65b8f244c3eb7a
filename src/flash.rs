//! One-shot notices kept in the session until the next rendered page.

use axum::{
    extract::rejection::FormRejection,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, error, warn};

use crate::error::AppError;

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Queue a notice. A session write failure only loses the notice.
pub async fn push(session: &Session, notice: Notice) {
    let mut pending: Vec<Notice> = match session.get(FLASH_KEY).await {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "reading pending notices failed");
            Vec::new()
        }
    };
    pending.push(notice);
    if let Err(e) = session.insert(FLASH_KEY, pending).await {
        warn!(error = %e, "storing notice failed");
    }
}

/// Drain every pending notice.
pub async fn take(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(FLASH_KEY).await {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "reading notices failed");
            Vec::new()
        }
    }
}

/// Queue `notice` and answer with a 303 to `to`.
pub async fn redirect_with(session: &Session, notice: Notice, to: &str) -> Response {
    push(session, notice).await;
    Redirect::to(to).into_response()
}

/// Log `err`, queue its user-facing notice and answer with a 303 to `to`.
/// `fallback` is shown for persistence failures.
pub async fn redirect_error(session: &Session, err: &AppError, fallback: &str, to: &str) -> Response {
    match err {
        AppError::Persistence(e) => error!(error = %e, "request failed"),
        other => debug!(error = %other, "request rejected"),
    }
    redirect_with(session, Notice::error(err.notice(fallback)), to).await
}

/// Unwrap a form body. A body that cannot be read as a form becomes a
/// notice and a 303 to `to` instead of a bare 4xx.
pub async fn form_or_redirect<T>(
    session: &Session,
    form: Result<Form<T>, FormRejection>,
    to: &str,
) -> Result<T, Response> {
    match form {
        Ok(Form(value)) => Ok(value),
        Err(rejection) => {
            debug!(error = %rejection, "form body rejected");
            let notice = Notice::error("Could not read the submitted form.");
            Err(redirect_with(session, notice, to).await)
        }
    }
}
