use std::future::Future;

use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha512_256};
use uuid::Uuid;

use crate::crypto::random;
use crate::error::{AppError, Result};
use crate::models::session::Session;

/// Entropy behind the salt half of the source string (16 chars base64url).
const SALT_BYTES: usize = 12;
/// Entropy behind the secret half of the source string (32 chars base64url).
const SECRET_BYTES: usize = 24;

/// Persistence capability for session records. Implemented by the Postgres
/// repository in production and by in-memory stores in tests.
pub trait SessionRecordStore: Send + Sync {
    /// Persists a new session record.
    fn insert(&self, record: NewSession) -> impl Future<Output = Result<Session>> + Send;

    /// Looks up a session matching both the id and the secret hash.
    fn find(
        &self,
        id: Uuid,
        secret_hash: &str,
    ) -> impl Future<Output = Result<Option<Session>>> + Send;

    /// Deletes a session row, returning how many rows went away. Deleting
    /// a session that does not exist is not an error.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<u64>> + Send;
}

/// A session record about to be persisted.
#[derive(Clone, Debug)]
pub struct NewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ip: String,
    pub user_agent: String,
    pub secret_hash: String,
}

/// Creates, validates and invalidates sessions over a record store, using a
/// split id/secret scheme so a leaked sessions table cannot be replayed.
#[derive(Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: SessionRecordStore> SessionStore<S> {
    /// Creates a `SessionStore` over the given record store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a session for `user_id` and returns the cookie value.
    ///
    /// The cookie value has the form `"{id}|{source}"` where `source` is a
    /// random salt concatenated with a random secret. Only the SHA-512/256
    /// hash of `source` is persisted.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        ip: &str,
        user_agent: &str,
    ) -> Result<String> {
        let salt = random::url_safe_token(SALT_BYTES)?;
        let secret = random::url_safe_token(SECRET_BYTES)?;
        let source = format!("{salt}{secret}");

        let record = NewSession {
            id: Uuid::new_v4(),
            user_id,
            ip: ip.to_owned(),
            user_agent: user_agent.to_owned(),
            secret_hash: hash_source(&source),
        };

        let session = self.store.insert(record).await?;
        tracing::debug!("🔑 Session created: {}", session.id);

        Ok(format!("{}|{}", session.id, source))
    }

    /// Resolves a cookie value back to its session record.
    ///
    /// An unknown id and a wrong secret both come back as
    /// [`AppError::SessionNotFound`]; callers cannot tell which half was
    /// wrong.
    pub async fn validate_session(&self, cookie_value: &str) -> Result<Session> {
        let (id, source) = split_cookie(cookie_value)?;

        self.store
            .find(id, &hash_source(source))
            .await?
            .ok_or(AppError::SessionNotFound)
    }

    /// Removes a session. Invalidating a session twice is fine.
    pub async fn invalidate_session(&self, id: Uuid) -> Result<()> {
        let removed = self.store.delete(id).await?;
        if removed == 0 {
            tracing::debug!("Session {} already invalidated", id);
        }
        Ok(())
    }
}

/// SHA-512/256 of a source string, rendered as URL-safe base64.
pub fn hash_source(source: &str) -> String {
    let digest = Sha512_256::digest(source.as_bytes());
    general_purpose::URL_SAFE.encode(digest)
}

/// Splits a cookie value into its id and source halves.
pub(crate) fn split_cookie(value: &str) -> Result<(Uuid, &str)> {
    let (id, source) = value.split_once('|').ok_or(AppError::MalformedCookie)?;
    if id.is_empty() || source.is_empty() {
        return Err(AppError::MalformedCookie);
    }
    let id = Uuid::parse_str(id).map_err(|_| AppError::MalformedCookie)?;
    Ok((id, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    /// In-memory stand-in for the sessions table.
    #[derive(Clone, Default)]
    struct MemorySessions {
        rows: Arc<Mutex<HashMap<Uuid, Session>>>,
    }

    impl MemorySessions {
        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn stored_hash(&self, id: Uuid) -> Option<String> {
            self.rows
                .lock()
                .unwrap()
                .get(&id)
                .map(|s| s.secret_hash.clone())
        }
    }

    impl SessionRecordStore for MemorySessions {
        async fn insert(&self, record: NewSession) -> Result<Session> {
            let session = Session {
                id: record.id,
                user_id: record.user_id,
                created_at: Utc::now(),
                ip: record.ip,
                user_agent: record.user_agent,
                secret_hash: record.secret_hash,
            };
            self.rows
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session)
        }

        async fn find(&self, id: Uuid, secret_hash: &str) -> Result<Option<Session>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&id)
                .filter(|s| s.secret_hash == secret_hash)
                .cloned())
        }

        async fn delete(&self, id: Uuid) -> Result<u64> {
            Ok(self.rows.lock().unwrap().remove(&id).map_or(0, |_| 1))
        }
    }

    fn store() -> (SessionStore<MemorySessions>, MemorySessions) {
        let repo = MemorySessions::default();
        (SessionStore::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_then_validate_round_trips() {
        let (sessions, _) = store();
        let user_id = Uuid::new_v4();

        let cookie = sessions
            .create_session(user_id, "203.0.113.7", "integration-test")
            .await
            .unwrap();

        let session = sessions.validate_session(&cookie).await.unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.ip, "203.0.113.7");
        assert_eq!(session.user_agent, "integration-test");
    }

    #[tokio::test]
    async fn cookie_value_is_id_pipe_source() {
        let (sessions, _) = store();
        let cookie = sessions
            .create_session(Uuid::new_v4(), "", "")
            .await
            .unwrap();

        let (id, source) = cookie.split_once('|').unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        // 16-char salt + 32-char secret.
        assert_eq!(source.len(), 48);
    }

    #[tokio::test]
    async fn secret_source_is_never_persisted() {
        let (sessions, repo) = store();
        let cookie = sessions
            .create_session(Uuid::new_v4(), "", "")
            .await
            .unwrap();

        let (id, source) = cookie.split_once('|').unwrap();
        let stored = repo.stored_hash(Uuid::parse_str(id).unwrap()).unwrap();
        assert_ne!(stored, source);
        assert_eq!(stored, hash_source(source));
    }

    #[tokio::test]
    async fn valid_id_with_wrong_secret_is_not_found() {
        let (sessions, _) = store();
        let cookie = sessions
            .create_session(Uuid::new_v4(), "", "")
            .await
            .unwrap();

        let (id, _) = cookie.split_once('|').unwrap();
        let err = sessions
            .validate_session(&format!("{id}|wrong-secret-entirely"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (sessions, _) = store();
        let err = sessions
            .validate_session(&format!("{}|somesource", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound));
    }

    #[tokio::test]
    async fn malformed_cookies_are_rejected_before_lookup() {
        let (sessions, _) = store();
        for bad in ["", "nodelimiter", "|source", "id|", "not-a-uuid|source"] {
            let err = sessions.validate_session(bad).await.unwrap_err();
            assert!(matches!(err, AppError::MalformedCookie), "input: {:?}", bad);
        }
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let (sessions, repo) = store();
        let cookie = sessions
            .create_session(Uuid::new_v4(), "", "")
            .await
            .unwrap();
        let (id, _) = split_cookie(&cookie).unwrap();

        sessions.invalidate_session(id).await.unwrap();
        assert_eq!(repo.row_count(), 0);
        // Second invalidation of the same id must not error.
        sessions.invalidate_session(id).await.unwrap();
    }
}
