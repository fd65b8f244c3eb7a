use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::SessionUser,
    password::{hash_password, verify_password},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::error::{AppError, AppResult};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// Create an account. Username and email must both be unused.
pub async fn register(
    users: &dyn UserRepo,
    username: &str,
    email: &str,
    password: &str,
    phone: Option<&str>,
) -> AppResult<User> {
    let username = username.trim();
    let email = normalize_email(email);
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::validation(
            "Please fill in username, email and password.",
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email address."));
    }

    if let Some(existing) = users.find_by_username_or_email(username, &email).await? {
        warn!(user_id = %existing.id, "username or email already registered");
        return Err(AppError::DuplicateIdentity);
    }

    let password_hash = hash_password(password)?;
    let user = users
        .create(NewUser {
            username: username.to_string(),
            email,
            phone: phone.and_then(non_empty),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Check a username/password pair and return the identity to keep in the session.
pub async fn authenticate(
    users: &dyn UserRepo,
    username: &str,
    password: &str,
) -> AppResult<SessionUser> {
    let user = users
        .find_by_username(username.trim())
        .await?
        .ok_or(AppError::NotFound("username"))?;

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredential);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(SessionUser {
        id: user.id,
        username: user.username,
        email: user.email,
    })
}

/// Replace the password of the account registered under `email`.
///
/// Knowing the email is the only proof required; no token or old password
/// is checked.
pub async fn reset_password(
    users: &dyn UserRepo,
    email: &str,
    new_password: &str,
) -> AppResult<()> {
    let email = normalize_email(email);
    if email.is_empty() || new_password.is_empty() {
        return Err(AppError::validation(
            "Please enter your email and a new password.",
        ));
    }
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("email"))?;

    let hash = hash_password(new_password)?;
    users.set_password_hash(user.id, &hash).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDb;

    async fn seeded() -> MemoryDb {
        let db = MemoryDb::new();
        register(&db, "alice", "alice@example.com", "old-secret", Some("555-0100"))
            .await
            .expect("seed user");
        db
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two words@example.com"));
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let db = seeded().await;
        let user = db.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "old-secret");
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let db = seeded().await;
        let err = register(&db, "alice", "other@example.com", "pw", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let db = seeded().await;
        let err = register(&db, "bob", "Alice@Example.com ", "pw", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn register_requires_fields() {
        let db = MemoryDb::new();
        let err = register(&db, "  ", "x@example.com", "pw", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = register(&db, "carol", "x@example.com", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let db = seeded().await;

        let who = authenticate(&db, "alice", "old-secret").await.unwrap();
        assert_eq!(who.username, "alice");
        assert_eq!(who.email, "alice@example.com");

        let err = authenticate(&db, "alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential));

        let err = authenticate(&db, "nobody", "old-secret").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_password_swaps_credentials() {
        let db = seeded().await;
        reset_password(&db, "alice@example.com", "new-secret")
            .await
            .unwrap();

        assert!(authenticate(&db, "alice", "new-secret").await.is_ok());
        let err = authenticate(&db, "alice", "old-secret").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential));
    }

    #[tokio::test]
    async fn reset_password_unknown_email() {
        let db = seeded().await;
        let err = reset_password(&db, "ghost@example.com", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("email")));
    }
}
