use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::access::Role;
use crate::auth::{self, Claims};
use crate::config;
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "accountType")]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

/// POST /auth/register - create a landlord or tenant account and open a
/// session for it.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<SessionResponse> {
    validate_credentials(&payload.email, &payload.password)?;

    if service::find_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("Email already exists"));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = service::insert_user(&payload.email, &password_hash, payload.role).await?;

    let session = open_session(user.id, user.email, user.role)?;
    Ok(ApiResponse::created(session))
}

/// POST /auth/login - exchange credentials for a session token.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<SessionResponse> {
    // Unknown email and wrong password produce the same response.
    let user = service::find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let session = open_session(user.id, user.email, user.role)?;
    Ok(ApiResponse::success(session))
}

fn open_session(id: Uuid, email: String, role: Role) -> Result<SessionResponse, ApiError> {
    let security = &config::config().security;
    let claims = Claims::new(id, email.clone(), role, security);
    let token = auth::generate_jwt(&claims, security)?;

    Ok(SessionResponse {
        token,
        user: SessionUser { id, email, role },
    })
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if email.len() < 3 || !email.contains('@') || email.contains(char::is_whitespace) {
        field_errors.insert("email".to_string(), "Invalid email address".to_string());
    }
    if password.len() < 8 {
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid registration fields", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_email_and_short_password() {
        assert!(validate_credentials("not-an-email", "longenough").is_err());
        assert!(validate_credentials("a@b.com", "short").is_err());
        assert!(validate_credentials("a b@c.com", "longenough").is_err());
        assert!(validate_credentials("a@b.com", "longenough").is_ok());
    }

    #[test]
    fn register_payload_accepts_legacy_account_type_field() {
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"email":"l@example.com","password":"landlordpw","accountType":"landlord"}"#,
        )
        .unwrap();
        assert_eq!(payload.role, Role::Landlord);
    }
}
