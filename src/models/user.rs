use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::models::audit::Timestamps;

/// A registered credential: identity plus password hash.
#[derive(Clone, Serialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's email address, unique and case-sensitive as stored.
    pub email: String,
    /// The encoded Argon2id hash of the user's password. Never serialized
    /// to clients and never logged.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Audit timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=2$c2FsdA$a2V5".to_string(),
            timestamps: Timestamps {
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let json = sonic_rs::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("u@example.com"));
    }

    #[test]
    fn password_hash_is_redacted_in_debug_output() {
        let rendered = format!("{:?}", sample_user());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("argon2id"));
    }
}
