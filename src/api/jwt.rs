use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AuthConfig;
use crate::config::validators::MAX_TOKEN_TTL_MINUTES;

/// Bearer token claims, `sub` is the owner id
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT Service for issuing and validating owner tokens (HS256)
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_ttl_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_minutes: token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES),
        }
    }

    /// Create JwtService from config
    ///
    /// An empty secret is replaced with a random one, so tokens issued by a
    /// previous process stop validating after restart.
    pub fn from_config(auth: &AuthConfig) -> Self {
        if auth.jwt_secret.is_empty() {
            warn!("auth.jwt_secret not configured, generating a random secret for this process");
            return Self::new(&generate_secret(32), auth.token_ttl_minutes);
        }
        Self::new(&auth.jwt_secret, auth.token_ttl_minutes)
    }

    pub fn issue_token(&self, owner_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = OwnerClaims {
            sub: owner_id.to_string(),
            iat: now.timestamp(),
            exp: Duration::try_minutes(self.token_ttl_minutes as i64)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .map(|exp| exp.timestamp())
                .unwrap_or(i64::MAX),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<OwnerClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<OwnerClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ));
        }

        Ok(token_data.claims)
    }
}

/// 随机十六进制密钥
fn generate_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill(&mut buf[..]);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}
