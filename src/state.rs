use crate::config::Config;
use crate::crypto::password::{Argon2Config, Argon2Hasher};
use crate::db;
use crate::error::Result;
use crate::repositories::session::PgSessionStore;
use crate::repositories::user::PgCredentialStore;
use crate::services::auth::AuthService;
use crate::services::session::SessionStore;

/// The concrete auth service the web layer runs against.
pub type Auth = AuthService<PgCredentialStore, PgSessionStore>;

/// The application's state.
///
/// Everything a handler needs travels through here; there are no
/// package-level globals.
#[derive(Clone)]
pub struct AppState {
    /// The assembled auth service.
    pub auth: Auth,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`: builds the pool, applies the schema, and
    /// wires the auth service from its collaborators.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized");

        db::run_migrations(&pool).await?;

        let credentials = PgCredentialStore::new(pool.clone());
        let sessions = SessionStore::new(PgSessionStore::new(pool));
        let hasher = Argon2Hasher::new(Argon2Config::default());

        Ok(AppState {
            auth: AuthService::new(credentials, sessions, hasher),
            config: config.clone(),
        })
    }
}
