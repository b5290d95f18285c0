use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token carries an invalid identity")]
    InvalidIdentity,
}

/// Claims issued by the identity service. This server only verifies them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) exp: i64,
}

pub(crate) struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(JwtError::Decode)?
            .claims;

        if claims.user_id <= 0 || claims.username.trim().is_empty() {
            return Err(JwtError::InvalidIdentity);
        }
        Ok(claims)
    }
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, user_id: i64, username: &str, ttl_seconds: i64) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        user_id,
        username: username.to_string(),
        exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("test token must encode")
}

#[cfg(test)]
mod tests {
    use super::{JwtError, JwtVerifier, issue_test_token};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn verifies_token_signed_with_same_secret() {
        let token = issue_test_token(SECRET, 42, "alice", 60);
        let claims = JwtVerifier::new(SECRET)
            .verify_token(&token)
            .expect("token must verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn rejects_foreign_signature_and_expired_token() {
        let verifier = JwtVerifier::new(SECRET);

        let foreign = issue_test_token("another-secret-another-secret-xx", 42, "alice", 60);
        assert!(matches!(
            verifier.verify_token(&foreign),
            Err(JwtError::Decode(_))
        ));

        let expired = issue_test_token(SECRET, 42, "alice", -3600);
        assert!(matches!(
            verifier.verify_token(&expired),
            Err(JwtError::Decode(_))
        ));
    }

    #[test]
    fn rejects_non_positive_user_id() {
        let token = issue_test_token(SECRET, 0, "ghost", 60);
        assert!(matches!(
            JwtVerifier::new(SECRET).verify_token(&token),
            Err(JwtError::InvalidIdentity)
        ));
    }
}
