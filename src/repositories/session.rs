use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::session::Session,
    services::session::{NewSession, SessionRecordStore},
};

/// Postgres-backed [`SessionRecordStore`].
#[derive(Clone)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row
            .try_get("id")
            .map_err(|_| AppError::MissingData("id".to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|_| AppError::MissingData("user_id".to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|_| AppError::MissingData("created_at".to_string()))?,
        ip: row
            .try_get("ip")
            .map_err(|_| AppError::MissingData("ip".to_string()))?,
        user_agent: row
            .try_get("user_agent")
            .map_err(|_| AppError::MissingData("user_agent".to_string()))?,
        secret_hash: row
            .try_get("hash")
            .map_err(|_| AppError::MissingData("hash".to_string()))?,
    })
}

impl SessionRecordStore for PgSessionStore {
    async fn insert(&self, record: NewSession) -> Result<Session> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO sessions (id, user_id, ip, user_agent, hash)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, user_id, created_at, ip, user_agent, hash
                "#,
                &[
                    &record.id,
                    &record.user_id,
                    &record.ip,
                    &record.user_agent,
                    &record.secret_hash,
                ],
            )
            .await?;
        row_to_session(&row)
    }

    async fn find(&self, id: Uuid, secret_hash: &str) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, user_id, created_at, ip, user_agent, hash
                FROM sessions
                WHERE id = $1 AND hash = $2
                "#,
                &[&id, &secret_hash],
            )
            .await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<u64> {
        let client = self.pool.get().await?;
        let removed = client
            .execute("DELETE FROM sessions WHERE id = $1", &[&id])
            .await?;
        Ok(removed)
    }
}
