use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use subtle::ConstantTimeEq;

use super::error::AuthError;
use super::model::{Principal, UserClaims};

/// Accepts the shared service token or a user session JWT.
#[derive(Debug, Clone, Default)]
pub struct TokenVerifier {
    service_token: Option<String>,
    jwt_secret: Option<String>,
}

impl TokenVerifier {
    pub fn new(service_token: Option<String>, jwt_secret: Option<String>) -> Self {
        let present = |value: &String| !value.is_empty();
        let verifier = Self {
            service_token: service_token.filter(present),
            jwt_secret: jwt_secret.filter(present),
        };
        if verifier.service_token.is_none() && verifier.jwt_secret.is_none() {
            log::warn!("Neither SERVICE_TOKEN nor JWT_SECRET is set, every contract request will be rejected");
        }
        verifier
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        if let Some(service_token) = &self.service_token {
            if bool::from(token.as_bytes().ct_eq(service_token.as_bytes())) {
                return Ok(Principal::Service);
            }
        }

        let secret = self.jwt_secret.as_deref().ok_or(AuthError::InvalidToken)?;
        let claims = validate_user_token(token, secret).map_err(|e| {
            log::warn!("Token validation failed: {:?}", e);
            AuthError::InvalidToken
        })?;
        Ok(Principal::User(claims.id))
    }
}

/// Decode a user session token signed with `secret` (HS256, unexpired).
pub fn validate_user_token(token: &str, secret: &str) -> Result<UserClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
