//! Identity provider contract.
//!
//! The ledger engine itself performs no authentication; it trusts that the
//! caller was already authorized. This module defines the interface the
//! identity collaborator satisfies: issue and verify a signed token carrying
//! the owner identity.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Owner identity as carried inside a signed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerClaims {
    /// Subject (owner id)
    pub sub: String,
    pub name: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

pub trait IdentityProvider: Send + Sync {
    fn issue(&self, owner_id: &str, name: &str, email: &str) -> Result<String, AppError>;
    fn verify(&self, token: &str) -> Result<OwnerClaims, AppError>;
}

/// HS256 implementation backed by a shared secret.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_days: i64,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, token_expiry_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_days,
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn issue(&self, owner_id: &str, name: &str, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = OwnerClaims {
            sub: owner_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.token_expiry_days)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    fn verify(&self, token: &str) -> Result<OwnerClaims, AppError> {
        let data = decode::<OwnerClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_round_trips() {
        let provider = JwtIdentityProvider::new("test-secret", 7);

        let token = provider
            .issue("owner-1", "Asha", "asha@example.com")
            .expect("failed to issue token");
        let claims = provider.verify(&token).expect("failed to verify token");

        assert_eq!(claims.sub, "owner-1");
        assert_eq!(claims.name, "Asha");
        assert_eq!(claims.email, "asha@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtIdentityProvider::new("secret-a", 7);
        let verifier = JwtIdentityProvider::new("secret-b", 7);

        let token = issuer
            .issue("owner-1", "Asha", "asha@example.com")
            .expect("failed to issue token");

        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let provider = JwtIdentityProvider::new("test-secret", -1);

        let token = provider
            .issue("owner-1", "Asha", "asha@example.com")
            .expect("failed to issue token");

        assert!(provider.verify(&token).is_err());
    }
}
