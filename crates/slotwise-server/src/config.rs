//! Server configuration from the environment.

use anyhow::Context;

const DEFAULT_PORT: u16 = 8080;

pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Ok(Self { database_url, port })
    }
}
