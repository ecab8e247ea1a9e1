//! Bearer-token identity for employees.
//!
//! The rest of the system treats identity resolution as a black box: a
//! request carries an opaque bearer value, this module resolves it to an
//! `employee_id`. Tokens are JWTs signed with `JWT_SECRET`.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const TOKEN_TTL_DAYS: i64 = 7;
const DEFAULT_DEV_SECRET: &str = "piecework-dev-secret";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid or expired authorization token")]
    InvalidToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeClaims {
    /// Employee id the token was issued for.
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

fn secret() -> Vec<u8> {
    std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEFAULT_DEV_SECRET.to_string())
        .into_bytes()
}

/// Issue a bearer token for an employee.
pub fn issue_employee_token(employee_id: Uuid) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = EmployeeClaims {
        sub: employee_id,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(&secret()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Resolve a bearer token back to the employee id it was issued for.
pub fn resolve_employee_token(token: &str) -> Result<Uuid, AuthError> {
    let data = decode::<EmployeeClaims>(
        token,
        &DecodingKey::from_secret(&secret()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_to_same_employee() {
        let id = Uuid::new_v4();
        let token = issue_employee_token(id).unwrap();
        assert_eq!(resolve_employee_token(&token).unwrap(), id);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            resolve_employee_token("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}
