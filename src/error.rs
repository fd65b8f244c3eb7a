use thiserror::Error;

/// Failures surfaced by the credential store and the entity services.
///
/// Handlers never return these to the client; they turn them into an error
/// notice and a redirect.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("username or email already registered")]
    DuplicateIdentity,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid credentials")]
    InvalidCredential,

    #[error("persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Message shown to the user. Persistence details stay in the logs.
    pub fn notice(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::DuplicateIdentity => "Username or email already exists.".into(),
            AppError::NotFound(what) => format!("{} does not exist.", capitalize(what)),
            AppError::InvalidCredential => "Incorrect password.".into(),
            AppError::Persistence(_) => fallback.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type AppResult<T> = Result<T, AppError>;
