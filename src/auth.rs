//! Current-actor resolution.
//!
//! The identity provider that issues credentials is an external collaborator;
//! this service only maps a presented bearer token to an active user row.
//! Every failure mode here is 401, returned before any resource logic runs.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::common::AppState;
use crate::entity::users;
use crate::error::AppError;

/// The authenticated user making the request.
pub struct CurrentUser(pub users::Model);

/// Pull the opaque token out of an `Authorization` header.
///
/// The scheme is matched case-insensitively (RFC 7235 schemes are
/// case-insensitive); whatever follows it is the token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?
            .to_string();

        let user = users::Entity::find()
            .filter(users::Column::ApiToken.eq(token))
            .filter(users::Column::IsActive.eq(true))
            .one(&*state.db)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid or revoked token".to_string()))?;

        Ok(Self(user))
    }
}
