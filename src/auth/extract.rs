//! Actor extraction from the Authorization header

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::TypedHeader;
use headers::authorization::Bearer;
use headers::Authorization;
use std::convert::Infallible;
use uuid::Uuid;

use super::jwt::{verify_token, JwtKeys};
use crate::error::ApiError;

/// The authenticated actor behind a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let claims = verify_token(&keys, bearer.token()).map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            is_admin: claims.admin,
        })
    }
}

/// Optional actor for endpoints that are readable anonymously. A missing
/// or invalid token degrades to an anonymous viewer instead of rejecting.
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
