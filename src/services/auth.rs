use std::future::Future;

use uuid::Uuid;

use crate::crypto::password::PasswordHasher;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::services::session::{SessionRecordStore, SessionStore, split_cookie};
use crate::validation::auth::{validate_email, validate_password};

/// Persistence capability for credentials. Implemented by the Postgres
/// repository in production and by counting mocks in tests.
pub trait CredentialStore: Send + Sync {
    /// Persists a new credential. The email must be unused.
    fn create_credential(
        &self,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User>> + Send;

    /// Looks up a credential by exact email.
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Looks up a credential by id.
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<User>>> + Send;
}

/// Orchestrates registration, login, logout and session gating.
///
/// Holds no mutable state of its own; everything it needs is injected at
/// construction and it is safe to clone into every request handler.
#[derive(Clone)]
pub struct AuthService<C, S, H = crate::crypto::password::Argon2Hasher> {
    credentials: C,
    sessions: SessionStore<S>,
    hasher: H,
}

impl<C, S, H> AuthService<C, S, H>
where
    C: CredentialStore,
    S: SessionRecordStore,
    H: PasswordHasher,
{
    /// Creates an `AuthService` from its injected collaborators.
    pub fn new(credentials: C, sessions: SessionStore<S>, hasher: H) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
        }
    }

    /// Registers a new credential.
    ///
    /// The password is submitted twice by the form; both copies must be
    /// present and identical. Input is validated before the store or the
    /// hasher is touched.
    pub async fn register(&self, email: &str, password: &str, confirm: &str) -> Result<User> {
        validate_email(email)?;
        validate_password(password)?;
        validate_password(confirm)?;

        if password != confirm {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self.credentials.create_credential(email, &password_hash).await?;

        tracing::info!("✅ User registered: {}", user.id);
        Ok(user)
    }

    /// Verifies credentials and issues a session.
    ///
    /// Returns the opaque cookie value for the web layer to attach with a
    /// 24-hour client-side expiry.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip: &str,
        user_agent: &str,
    ) -> Result<String> {
        validate_email(email)?;
        validate_password(password)?;

        let user = self
            .credentials
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let matched = self
            .hasher
            .verify_password(password, &user.password_hash)
            .map_err(|e| AppError::HashComparison(e.to_string()))?;

        if !matched {
            tracing::warn!("🔐 Password mismatch for user: {}", user.id);
            return Err(AppError::PasswordMismatch);
        }

        let cookie_value = self.sessions.create_session(user.id, ip, user_agent).await?;
        tracing::info!("✅ User logged in: {}", user.id);

        Ok(cookie_value)
    }

    /// Tears down the server side of a session, best-effort.
    ///
    /// Logout is always reported successful to the client; the web layer
    /// clears the cookie regardless of what happens here, so failures are
    /// logged and swallowed.
    pub async fn logout(&self, cookie_value: &str) {
        let Ok((id, _)) = split_cookie(cookie_value) else {
            tracing::debug!("👋 Logout with unparseable session cookie");
            return;
        };

        if let Err(e) = self.sessions.invalidate_session(id).await {
            tracing::warn!("Failed to invalidate session {}: {}", id, e);
        } else {
            tracing::info!("👋 Session invalidated: {}", id);
        }
    }

    /// Resolves a session cookie to its owning credential.
    ///
    /// Any rejection here is a control-flow outcome for the middleware to
    /// turn into a redirect, not a fault.
    pub async fn require_session(&self, cookie_value: &str) -> Result<User> {
        let session = self.sessions.validate_session(cookie_value).await?;

        self.credentials
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::SessionNotFound)
    }
}
