use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Form body for `POST /register`. Missing fields deserialize as empty and
/// are rejected by the service, not by the extractor.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Form body for `POST /login`.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Form body for `POST /forgot`.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ForgotForm {
    pub email: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

/// Public identity of a logged-in user, as stored in the session.
/// A copy taken at login time; it does not follow later edits to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
