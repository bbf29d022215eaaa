use actix_web::{Error, HttpMessage, dev::ServiceRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::user::model::UserSnapshot;
use crate::utils::error::CustomError;

/// Profile claims carried by the identity provider's bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    pub sub: String,
    pub image_url: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub exp: usize,
}

impl IdentityClaims {
    /// Snapshot of the profile as it is at this moment; records written with
    /// it keep these values even if the profile changes later.
    pub fn to_snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            user_id: self.sub.clone(),
            user_image: self.image_url.clone(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone(),
        }
    }
}

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

pub fn decode_identity_token(token: &str, secret: &str) -> Result<IdentityClaims, CustomError> {
    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| CustomError::AuthenticationError("Invalid token".to_string()))
}

/// Mint a provider-style token. Issuance belongs to the external provider;
/// this exists for tests and local tooling.
pub fn encode_identity_token(claims: &IdentityClaims, secret: &str) -> Result<String, CustomError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| CustomError::AuthenticationError("Token generation failed".to_string()))
}

/// Bearer middleware: validates the provider token and stashes its claims in
/// the request extensions for handlers to pick up.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    match decode_identity_token(credentials.token(), &jwt_secret()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(_) => Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    }
}

/// Authenticated caller for the current request, or AuthenticationError when
/// the auth middleware put no claims on it.
pub fn current_user(req: &actix_web::HttpRequest) -> Result<UserSnapshot, CustomError> {
    req.extensions()
        .get::<IdentityClaims>()
        .map(IdentityClaims::to_snapshot)
        .ok_or_else(|| CustomError::AuthenticationError("User not authenticated".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> IdentityClaims {
        IdentityClaims {
            sub: "u1".to_string(),
            image_url: "https://img.example/u1.png".to_string(),
            first_name: Some("A".to_string()),
            last_name: Some("B".to_string()),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let token = encode_identity_token(&claims(), "test-secret").unwrap();
        let decoded = decode_identity_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, "u1");
        assert_eq!(decoded.image_url, "https://img.example/u1.png");
        assert_eq!(decoded.first_name.as_deref(), Some("A"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_identity_token(&claims(), "test-secret").unwrap();
        assert!(matches!(
            decode_identity_token(&token, "other-secret"),
            Err(CustomError::AuthenticationError(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims();
        expired.exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize;
        let token = encode_identity_token(&expired, "test-secret").unwrap();
        assert!(decode_identity_token(&token, "test-secret").is_err());
    }

    #[test]
    fn snapshot_defaults_missing_first_name_to_empty() {
        let mut c = claims();
        c.first_name = None;
        c.last_name = None;
        let snapshot = c.to_snapshot();
        assert_eq!(snapshot.user_id, "u1");
        assert_eq!(snapshot.first_name, "");
        assert!(snapshot.last_name.is_none());
        assert!(snapshot.validate().is_ok());
    }
}
