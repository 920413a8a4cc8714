use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A server-side session record backing one logged-in browser.
///
/// The `id` is the public half of the cookie; it is never sufficient to
/// authenticate on its own. The client also holds a `source` string whose
/// SHA-512/256 hash must match `secret_hash`. The source itself is never
/// persisted.
#[derive(Clone, Debug)]
pub struct Session {
    /// Globally unique opaque identifier, also the cookie's public half.
    pub id: Uuid,
    /// The credential this session belongs to.
    pub user_id: Uuid,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Client address at login, for audit.
    pub ip: String,
    /// Client user agent at login, for audit.
    pub user_agent: String,
    /// One-way hash of the client-held secret source string.
    pub secret_hash: String,
}
