//! Environment-backed configuration

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Forum private-message endpoint. When unset, notifications are
    /// logged instead of delivered.
    pub forum_pm_url: Option<String>,
    pub forum_pm_token: String,
    /// Name the forum shows as the sender of service messages
    pub system_actor: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .context("PORT must be a number")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let forum_pm_url = std::env::var("FORUM_PM_URL").ok();
        let forum_pm_token = std::env::var("FORUM_PM_TOKEN").unwrap_or_default();
        let system_actor =
            std::env::var("SYSTEM_ACTOR").unwrap_or_else(|_| "Deald".to_string());

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            forum_pm_url,
            forum_pm_token,
            system_actor,
        })
    }
}
