use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn issue(secret: &str, user: &UserRow, kind: TokenKind, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        kind,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
}

pub fn issue_pair(config: &Config, user: &UserRow) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: issue(
            &config.secret_key,
            user,
            TokenKind::Access,
            Duration::minutes(config.access_token_expire_minutes),
        )?,
        refresh_token: issue(
            &config.secret_key,
            user,
            TokenKind::Refresh,
            Duration::days(config.refresh_token_expire_days),
        )?,
    })
}

/// Verifies signature and expiry. Returns `None` for any malformed or expired token.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "awa@example.cm".to_string(),
            password_hash: String::new(),
            role: "student".to_string(),
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pair_carries_kind_and_subject() {
        let config = Config::for_tests();
        let user = user();
        let pair = issue_pair(&config, &user).unwrap();

        let access = decode_token(&config.secret_key, &pair.access_token).unwrap();
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.sub, user.id);
        assert_eq!(access.role, "student");
        assert_eq!(access.exp - access.iat, 30 * 60);

        let refresh = decode_token(&config.secret_key, &pair.refresh_token).unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = Config::for_tests();
        let pair = issue_pair(&config, &user()).unwrap();
        assert!(decode_token("another-secret", &pair.access_token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue("s3cret", &user(), TokenKind::Access, Duration::hours(-2)).unwrap();
        assert!(decode_token("s3cret", &token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_token("s3cret", "not.a.jwt").is_none());
    }
}
