//! Validation of the candidate access tokens issued by the institution SSO.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload that
//! identifies the candidate towards the remote admission service.

use admission_client::Identity;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims of a candidate access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the candidate's global id.
    pub sub: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Preferred language, e.g. `"en"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

impl Claims {
    /// Identity forwarded to the admission service.
    pub fn into_identity(self, default_language: &str) -> Identity {
        Identity {
            global_id: self.sub,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            language: self.language.unwrap_or_else(|| default_language.to_string()),
        }
    }
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the SSO.
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`] (default: 60).
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Mint an access token for `identity`. Used by tooling and tests; in
/// production tokens come from the SSO.
pub fn generate_access_token(
    identity: &Identity,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: identity.global_id.clone(),
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        email: identity.email.clone(),
        language: Some(identity.language.clone()),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn identity() -> Identity {
        Identity {
            global_id: "00012345".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            language: "en".into(),
        }
    }

    #[test]
    fn token_round_trip_yields_identity() {
        let config = test_config();
        let token = generate_access_token(&identity(), &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.into_identity("fr-be"), identity());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&identity(), &test_config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret-entirely-different-value".into(),
            access_token_expiry_mins: 15,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn missing_language_falls_back_to_default() {
        let claims = Claims {
            sub: "1".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            language: None,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert_eq!(claims.into_identity("fr-be").language, "fr-be");
    }
}
