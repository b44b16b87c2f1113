use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::entities::UserId;
use crate::domain::value_objects::UserRole;
use crate::infrastructure::config::AuthConfig;
use crate::presentation::middleware::error::AppError;

/// Distinguishes short-lived access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,     // Subject (user ID)
    pub role: UserRole,  // Global user role at issuance
    pub typ: TokenType,  // access | refresh
    pub iss: String,     // Issuer
    pub iat: u64,        // Issued at
    pub exp: u64,        // Expiration time
    pub jti: String,     // JWT ID (unique identifier)
}

impl Claims {
    fn new(issuer: &str, user_id: UserId, role: UserRole, typ: TokenType, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        Self {
            sub: user_id.to_string(),
            role,
            typ,
            iss: issuer.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<UserId, JwtError> {
        self.sub.parse().map_err(|_| JwtError::InvalidToken)
    }
}

/// Access/refresh pair handed to clients after login, registration or refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn from_secret(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    issuer: String,
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl JwtService {
    /// Create a JWT service from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            issuer: config.issuer.clone(),
            access: SigningKeys::from_secret(
                &config.access_token_secret,
                Duration::from_secs(config.access_token_ttl_minutes.saturating_mul(60)),
            ),
            refresh: SigningKeys::from_secret(
                &config.refresh_token_secret,
                Duration::from_secs(config.refresh_token_ttl_days.saturating_mul(24 * 3600)),
            ),
            validation,
        }
    }

    /// Sign a short-lived access token
    pub fn sign_access_token(&self, user_id: UserId, role: UserRole) -> Result<String, JwtError> {
        let claims = Claims::new(&self.issuer, user_id, role, TokenType::Access, self.access.ttl);
        Self::encode_claims(&claims, &self.access.encoding)
    }

    /// Sign a long-lived refresh token
    pub fn sign_refresh_token(&self, user_id: UserId, role: UserRole) -> Result<String, JwtError> {
        let claims = Claims::new(&self.issuer, user_id, role, TokenType::Refresh, self.refresh.ttl);
        Self::encode_claims(&claims, &self.refresh.encoding)
    }

    /// Issue a fresh access/refresh pair
    pub fn issue_pair(&self, user_id: UserId, role: UserRole) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.sign_access_token(user_id, role)?,
            refresh_token: self.sign_refresh_token(user_id, role)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access.ttl.as_secs(),
        })
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.access.decoding, TokenType::Access)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.refresh.decoding, TokenType::Refresh)
    }

    /// Encode claims into JWT token
    fn encode_claims(claims: &Claims, key: &EncodingKey) -> Result<String, JwtError> {
        encode(&Header::default(), claims, key).map_err(|e| {
            error!("Failed to encode JWT: {}", e);
            JwtError::EncodingError(e.to_string())
        })
    }

    fn verify(&self, token: &str, key: &DecodingKey, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                debug!("Failed to decode JWT: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::InvalidToken,
                }
            })?;

        if claims.typ != expected {
            return Err(JwtError::WrongTokenType { expected, actual: claims.typ });
        }

        Ok(claims)
    }
}

/// JWT-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType { expected: TokenType, actual: TokenType },

    #[error("Token encoding error: {0}")]
    EncodingError(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => {
                AppError::Authentication { message: "Token has expired".to_string() }
            }
            JwtError::InvalidSignature | JwtError::InvalidToken | JwtError::WrongTokenType { .. } => {
                AppError::Authentication { message: "Invalid token".to_string() }
            }
            JwtError::EncodingError(msg) => {
                AppError::Internal { message: format!("JWT processing error: {msg}") }
            }
        }
    }
}
