use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Role;
use crate::config::SecurityConfig;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    TokenGeneration(String),
    #[error("invalid token: {0}")]
    TokenInvalid(String),
    #[error("token expired")]
    TokenExpired,
    #[error("credential hashing error: {0}")]
    Crypto(String),
}

/// Sign claims into a bearer token (HS256).
pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify a bearer token's signature and expiry and return its claims.
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Hash a password into an Argon2id PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hashing failed: {e}")))
}

/// Verify a plaintext password against a stored Argon2id hash.
///
/// Returns `Ok(false)` on mismatch; an error only if the stored hash is
/// malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 4,
            enable_cors: false,
            cors_origins: vec![],
        }
    }

    #[test]
    fn jwt_round_trip_preserves_claims() {
        let security = security();
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "a@b.com".into(), Role::Landlord, &security);

        let token = generate_jwt(&claims, &security).unwrap();
        let decoded = validate_jwt(&token, &security).unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.email, "a@b.com");
        assert_eq!(decoded.role, Role::Landlord);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let security = security();
        let claims = Claims::new(Uuid::new_v4(), "a@b.com".into(), Role::Tenant, &security);
        let mut token = generate_jwt(&claims, &security).unwrap();
        token.push('x');

        assert!(matches!(
            validate_jwt(&token, &security),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let security = security();
        let other = SecurityConfig { jwt_secret: "other".to_string(), ..security.clone() };
        let claims = Claims::new(Uuid::new_v4(), "a@b.com".into(), Role::Tenant, &other);
        let token = generate_jwt(&claims, &other).unwrap();

        assert!(validate_jwt(&token, &security).is_err());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let security = security();
        let mut claims = Claims::new(Uuid::new_v4(), "a@b.com".into(), Role::Tenant, &security);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = generate_jwt(&claims, &security).unwrap();

        assert!(matches!(validate_jwt(&token, &security), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn empty_secret_fails_closed() {
        let security = SecurityConfig { jwt_secret: String::new(), ..security() };
        let claims = Claims::new(Uuid::new_v4(), "a@b.com".into(), Role::Tenant, &security);

        assert!(matches!(generate_jwt(&claims, &security), Err(AuthError::MissingSecret)));
        assert!(matches!(validate_jwt("abc", &security), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_match() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
