//! Identity resolution against the host forum's user table
//!
//! The feedback service never owns user records; it reads the forum's
//! `users` table through this seam so tests and alternative hosts can
//! swap the backing store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// User record as seen by the feedback service
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_username(&self, username: &str) -> Result<Option<UserRecord>, ApiError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, ApiError>;
}

/// Resolver backed by the forum's Postgres user table
pub struct PgIdentityResolver {
    db_pool: PgPool,
}

impl PgIdentityResolver {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve_username(&self, username: &str) -> Result<Option<UserRecord>, ApiError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, avatar, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, ApiError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, avatar, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }
}
