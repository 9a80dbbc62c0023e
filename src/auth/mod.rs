use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod password;

/// Numeric user id carried by a token
pub type SubjectId = i32;

/// Lifetime of every issued token; there is no refresh
pub const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub authorized: bool,
    pub user_id: SubjectId,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token claim missing: {0}")]
    ClaimMissing(&'static str),

    #[error("token claim has the wrong type: {0}")]
    ClaimTypeMismatch(&'static str),
}

/// Issues and checks HS256 bearer tokens
///
/// Built once from the configured secret and shared by the login/register
/// handlers and the authentication middleware.
pub struct TokenService {
    secret_present: bool,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            secret_present: !secret.is_empty(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, subject: SubjectId) -> Result<String, TokenError> {
        if !self.secret_present {
            return Err(TokenError::Signing("signing key is empty".to_string()));
        }

        let claims = Claims {
            authorized: true,
            user_id: subject,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<(), TokenError> {
        self.decode_claims(token).map(|_| ())
    }

    pub fn extract_subject(&self, token: &str) -> Result<SubjectId, TokenError> {
        let claims = self.decode_claims(token)?;

        let raw = claims
            .get("user_id")
            .ok_or(TokenError::ClaimMissing("user_id"))?;

        raw.as_i64()
            .and_then(|id| SubjectId::try_from(id).ok())
            .ok_or(TokenError::ClaimTypeMismatch("user_id"))
    }

    fn decode_claims(&self, token: &str) -> Result<Value, TokenError> {
        decode::<Value>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}
