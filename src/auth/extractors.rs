use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, warn};

use super::dto::SessionUser;
use crate::flash::{self, Notice};

/// Session key holding the logged-in [`SessionUser`].
pub const SESSION_USER_KEY: &str = "user";

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Identity read from the session. An unreadable session counts as anonymous.
pub async fn session_user(session: &Session) -> Option<SessionUser> {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "session read failed; treating request as anonymous");
            None
        }
    }
}

/// The viewer of the current request, passed explicitly to handlers.
pub struct CurrentUser(pub Option<SessionUser>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(CurrentUser(session_user(&session).await))
    }
}

/// Route-level access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only logged-in users; others go to the login page with a notice.
    RequireAuthenticated,
    /// Only anonymous users; logged-in users go home.
    RequireAnonymous,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Redirect {
        to: &'static str,
        notice: Option<&'static str>,
    },
}

impl Guard {
    pub fn check(self, user: Option<&SessionUser>) -> Verdict {
        match (self, user) {
            (Guard::RequireAuthenticated, Some(_)) | (Guard::RequireAnonymous, None) => {
                Verdict::Pass
            }
            (Guard::RequireAuthenticated, None) => Verdict::Redirect {
                to: LOGIN_PATH,
                notice: Some("Please log in to continue."),
            },
            (Guard::RequireAnonymous, Some(_)) => Verdict::Redirect {
                to: HOME_PATH,
                notice: None,
            },
        }
    }

    async fn enforce(self, session: Session, req: Request, next: Next) -> Response {
        let user = session_user(&session).await;
        match self.check(user.as_ref()) {
            Verdict::Pass => next.run(req).await,
            Verdict::Redirect { to, notice } => {
                debug!(guard = ?self, path = %req.uri().path(), to, "guard redirect");
                if let Some(message) = notice {
                    flash::push(&session, Notice::error(message)).await;
                }
                Redirect::to(to).into_response()
            }
        }
    }
}

/// Middleware for [`Guard::RequireAuthenticated`].
pub async fn require_authenticated(session: Session, req: Request, next: Next) -> Response {
    Guard::RequireAuthenticated.enforce(session, req, next).await
}

/// Middleware for [`Guard::RequireAnonymous`].
pub async fn require_anonymous(session: Session, req: Request, next: Next) -> Response {
    Guard::RequireAnonymous.enforce(session, req, next).await
}
