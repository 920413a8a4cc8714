use chrono::{DateTime, Utc};
use serde::Serialize;

/// Audit timestamps shared by persisted entities.
///
/// Composed into each model explicitly rather than inherited from a common
/// base row type.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Timestamps {
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}
