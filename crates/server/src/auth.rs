// crates/server/src/auth.rs
//! Bearer-token check for administrative routes.
//!
//! Admin tokens are HS256 JWTs signed with the configured secret. With no
//! secret configured the check fails closed: every admin request is
//! unauthorized rather than open.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use atrium_core::{AppConfig, ServiceError};

use crate::error::ApiError;

/// Claims carried by an admin token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Validate the `Authorization: Bearer` header against the admin secret.
pub fn authorize_admin(config: &AppConfig, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let Some(secret) = config.auth_secret.as_deref() else {
        return Err(ServiceError::Unauthorized("admin secret not configured".into()).into());
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".into()))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config_with_secret(secret: Option<&str>) -> AppConfig {
        let secret = secret.map(str::to_string);
        AppConfig::from_lookup(|var| {
            if var == "ATRIUM_AUTH_SECRET" {
                secret.clone()
            } else {
                None
            }
        })
        .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn sign(secret: &str, exp: usize) -> String {
        encode(
            &Header::default(),
            &Claims {
                sub: "ops".to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_accepted() {
        let config = config_with_secret(Some("s3cret"));
        let token = sign("s3cret", 4102444800); // far future
        let claims = authorize_admin(&config, &bearer(&token)).unwrap();
        assert_eq!(claims.sub, "ops");
    }

    #[test]
    fn test_missing_header_rejected() {
        let config = config_with_secret(Some("s3cret"));
        let err = authorize_admin(&config, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err.0, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = config_with_secret(Some("s3cret"));
        let token = sign("other-secret", 4102444800);
        let err = authorize_admin(&config, &bearer(&token)).unwrap_err();
        assert!(matches!(err.0, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config_with_secret(Some("s3cret"));
        let token = sign("s3cret", 1); // 1970
        let err = authorize_admin(&config, &bearer(&token)).unwrap_err();
        assert!(matches!(err.0, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn test_no_secret_fails_closed() {
        let config = config_with_secret(None);
        let token = sign("s3cret", 4102444800);
        let err = authorize_admin(&config, &bearer(&token)).unwrap_err();
        assert!(matches!(err.0, ServiceError::Unauthorized(_)));
    }
}
