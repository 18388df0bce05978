use crate::types::{Claims, Role};
use crate::utils::toml_config::ConfigError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of an unpadded base64url HS256 signature segment.
const SIGNATURE_SEGMENT_LEN: usize = 43;

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Signing material and token lifetime, loaded once at startup.
#[derive(Clone)]
pub struct SecurityConfig {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl SecurityConfig {
    /// Build a security config, rejecting secrets shorter than 256 bits and
    /// non-positive lifetimes.
    pub fn new(secret: impl Into<Vec<u8>>, lifetime: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                min_bytes: MIN_SECRET_LEN,
            });
        }
        if lifetime <= Duration::zero() {
            return Err(ConfigError::ValidationError(
                "token lifetime must be positive".to_string(),
            ));
        }
        Ok(Self { secret, lifetime })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

impl From<TokenError> for crate::types::AppError {
    fn from(_: TokenError) -> Self {
        crate::types::AppError::Unauthenticated
    }
}

/// On-the-wire claim set. `sub` is a string as registered JWT claims require.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and validates HS256 bearer tokens.
///
/// The secret never leaves this type and is never logged.
pub struct TokenService {
    secret: Vec<u8>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.secret.clone(),
            encoding_key: EncodingKey::from_secret(&security.secret),
            decoding_key: DecodingKey::from_secret(&security.secret),
            lifetime: security.lifetime,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Mint a token for `subject_id` valid from `now` until `now + lifetime`.
    pub fn issue(
        &self,
        subject_id: i64,
        role: Role,
        now: DateTime<Utc>,
    ) -> crate::types::Result<String> {
        let iat = now.timestamp();
        let claims = TokenClaims {
            sub: subject_id.to_string(),
            role,
            iat,
            exp: iat + self.lifetime.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| crate::types::AppError::Internal(format!("Failed to encode token: {}", e)))
    }

    /// Check signature, structure and expiry of `token` as of `now`.
    ///
    /// The MAC over the raw segments is checked before anything is decoded,
    /// so a token that is well-formed on the outside but altered anywhere
    /// is always `BadSignature`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.verify_signature(token)?;

        // Expiry is checked below against the caller's clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let subject_id = claims.sub.parse::<i64>().map_err(|_| TokenError::Malformed)?;
        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Claims {
            subject_id,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Compare the signature segment against an HMAC of `header.payload`.
    fn verify_signature(&self, token: &str) -> Result<(), TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        let &[header, payload, signature] = segments.as_slice() else {
            return Err(TokenError::Malformed);
        };
        let is_base64url = |s: &str| !s.is_empty() && s.bytes().all(is_base64url_byte);
        if !(is_base64url(header) && is_base64url(payload) && is_base64url(signature))
            || signature.len() != SIGNATURE_SEGMENT_LEN
        {
            return Err(TokenError::Malformed);
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::Malformed)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(TokenError::BadSignature)
        }
    }
}

fn is_base64url_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
