use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::audit::Timestamps,
    models::user::User,
    services::auth::CredentialStore,
};

/// Postgres-backed [`CredentialStore`].
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: Pool,
}

impl PgCredentialStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row
            .try_get("id")
            .map_err(|_| AppError::MissingData("id".to_string()))?,
        email: row
            .try_get("email")
            .map_err(|_| AppError::MissingData("email".to_string()))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|_| AppError::MissingData("password_hash".to_string()))?,
        timestamps: Timestamps {
            created_at: row
                .try_get("created_at")
                .map_err(|_| AppError::MissingData("created_at".to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|_| AppError::MissingData("updated_at".to_string()))?,
        },
    })
}

/// Translates a unique-index violation on `email` into [`AppError::EmailTaken`].
fn map_insert_error(e: tokio_postgres::Error) -> AppError {
    if let Some(db_error) = e.as_db_error() {
        if db_error.code() == &SqlState::UNIQUE_VIOLATION {
            return AppError::EmailTaken;
        }
    }
    AppError::Database(e)
}

impl CredentialStore for PgCredentialStore {
    async fn create_credential(&self, email: &str, password_hash: &str) -> Result<User> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO users (id, email, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id, email, password_hash, created_at, updated_at
                "#,
                &[&Uuid::new_v4(), &email, &password_hash],
            )
            .await
            .map_err(map_insert_error)?;
        row_to_user(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, email, password_hash, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, email, password_hash, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
                &[&id],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }
}
