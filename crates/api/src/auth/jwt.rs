//! Bearer-token validation.
//!
//! Tokens are issued by the identity provider and signed with HS256 using a
//! shared secret. This service only verifies them; the same token is
//! forwarded to the content backend unchanged.

use jsonwebtoken::{decode, DecodingKey, Validation};
use reetr_core::admin::{admin_status, AdminStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by an access token.
///
/// Only `sub` and `exp` are required; everything else (admin flags,
/// metadata, roles) is kept in `extra` for admin detection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the identity provider's user id.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Admin status derived from the non-standard claims.
    pub fn admin_status(&self, namespace: &str) -> AdminStatus {
        admin_status(&Value::Object(self.extra.clone()), namespace)
    }
}

/// Configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to verify tokens.
    pub secret: String,
    /// Expected `aud` claim. When unset the audience is not checked.
    pub audience: Option<String>,
}

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var        | Required | Default |
    /// |----------------|----------|---------|
    /// | `JWT_SECRET`   | **yes**  | --      |
    /// | `JWT_AUDIENCE` | no       | unset   |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let audience = std::env::var("JWT_AUDIENCE")
            .ok()
            .filter(|aud| !aud.is_empty());

        Self { secret, audience }
    }
}

/// Validate and decode a token, returning its [`Claims`].
///
/// Checks the signature and expiration, and the audience when configured.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    match &config.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            audience: None,
        }
    }

    fn sign(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    #[test]
    fn test_validate_keeps_extra_claims() {
        let config = test_config();
        let token = sign(
            json!({
                "sub": "auth0|42",
                "exp": future_exp(),
                "app_metadata": {"isAdmin": true}
            }),
            &config.secret,
        );

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, "auth0|42");
        let status = claims.admin_status("https://yourapp.com");
        assert!(status.is_admin);
        assert_eq!(status.source, Some("app_metadata.isAdmin"));
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        // Well beyond the default 60-second leeway.
        let token = sign(json!({"sub": "u", "exp": now - 300}), &config.secret);

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let token = sign(json!({"sub": "u", "exp": future_exp()}), "secret-alpha");
        assert!(validate_token(&token, &test_config()).is_err());
    }

    #[test]
    fn test_audience_checked_only_when_configured() {
        let mut config = test_config();
        let token = sign(
            json!({"sub": "u", "exp": future_exp(), "aud": "reetr-admin"}),
            &config.secret,
        );
        assert!(validate_token(&token, &config).is_ok());

        config.audience = Some("reetr-admin".into());
        assert!(validate_token(&token, &config).is_ok());

        config.audience = Some("someone-else".into());
        assert!(validate_token(&token, &config).is_err());
    }
}
