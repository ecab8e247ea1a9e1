use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use utils::auth::{self, AuthError};
use uuid::Uuid;

use crate::error::ApiError;

/// Employee identity resolved from the request's bearer token. Identity
/// resolution is opaque to everything downstream of this extractor.
pub struct AuthEmployee(pub Uuid);

impl<S> FromRequestParts<S> for AuthEmployee
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;
        let employee_id = auth::resolve_employee_token(token)?;
        Ok(AuthEmployee(employee_id))
    }
}
