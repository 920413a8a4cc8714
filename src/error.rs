use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A pool construction error.
    #[error("Pool build error: {0}")]
    PoolBuild(#[from] deadpool_postgres::CreatePoolError),

    /// A row came back without an expected column.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// The submitted email does not look like an email address.
    #[error("Passed email is not an email format")]
    InvalidEmailFormat,

    /// The submitted password was empty.
    #[error("Passed password is empty")]
    EmptyPassword,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A user with that email already exists.
    #[error("Email is already registered")]
    EmailTaken,

    /// No credential matches the submitted email.
    #[error("No user by that email address")]
    UserNotFound,

    /// The submitted password does not match the stored hash.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The session cookie value is not of the form `id|source`.
    #[error("Malformed session cookie")]
    MalformedCookie,

    /// No session matches the presented id and secret.
    #[error("Session not found")]
    SessionNotFound,

    /// The OS entropy source failed.
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// A stored encoded hash could not be parsed.
    #[error("The encoded hash is not in the correct format")]
    MalformedHash,

    /// A stored encoded hash carries an unsupported Argon2 version.
    #[error("Incompatible version of argon2: {0}")]
    UnsupportedHashVersion(u32),

    /// A key-derivation error inside the hashing backend.
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Password verification itself failed (as opposed to a mismatch).
    #[error("Checking passwords failed: {0}")]
    HashComparison(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::PoolBuild(ref e) => {
                tracing::error!("Pool build error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::MissingData(ref column) => {
                tracing::error!("Row missing column: {}", column);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::InvalidEmailFormat => {
                tracing::debug!("Rejected malformed email");
                (
                    StatusCode::BAD_REQUEST,
                    "Passed email is not an email format.".to_string(),
                )
            }

            AppError::EmptyPassword => {
                tracing::debug!("Rejected empty password");
                (StatusCode::BAD_REQUEST, "Passed password is empty.".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }

            AppError::EmailTaken => {
                tracing::debug!("Registration with taken email");
                (StatusCode::CONFLICT, "Email is already registered.".to_string())
            }

            // Unknown user and wrong password are indistinguishable from the
            // outside so the login form cannot be used to enumerate accounts.
            AppError::UserNotFound | AppError::PasswordMismatch => {
                tracing::warn!("Login failed");
                (StatusCode::UNAUTHORIZED, "Invalid email or password.".to_string())
            }

            AppError::MalformedCookie | AppError::SessionNotFound => {
                tracing::debug!("Session check failed");
                (StatusCode::UNAUTHORIZED, "Not logged in.".to_string())
            }

            AppError::RandomSource(ref msg) => {
                tracing::error!("Random source error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::MalformedHash => {
                tracing::error!("Stored password hash is malformed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::UnsupportedHashVersion(found) => {
                tracing::error!("Stored password hash has unsupported version: {}", found);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Hashing(ref msg) => {
                tracing::error!("Hashing error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::HashComparison(ref msg) => {
                tracing::error!("Checking passwords failed: {}", msg);
                (StatusCode::BAD_REQUEST, "Checking passwords failed.".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
