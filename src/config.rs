use std::env;
use anyhow::{Context, Result};

/// The application's configuration.
///
/// Only the pieces the service itself cannot derive: where the database
/// lives and which port to listen on. Everything else is fixed at startup.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The port the HTTP server listens on.
    pub port: u16,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8090".to_string())
                .parse()
                .context("Invalid PORT")?,
        })
    }
}
