//! Password credentials.
//!
//! A credential is an HMAC-SHA512 digest of the UTF-8 password, keyed by a
//! fresh 512-bit random salt. Using the salt as the MAC key binds the two
//! together; verification recomputes the MAC and compares in constant time.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Salt length in bytes (the HMAC-SHA512 block-sized key).
pub const SALT_LEN: usize = 64;
/// Digest length in bytes.
pub const DIGEST_LEN: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
    #[error("password must not be empty")]
    EmptyCredential,
    #[error("salt rejected as MAC key")]
    KeyRejected,
}

impl From<HashError> for crate::types::AppError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::EmptyCredential => {
                crate::types::AppError::InvalidInput("Password must not be empty".to_string())
            }
            HashError::KeyRejected => crate::types::AppError::Internal(err.to_string()),
        }
    }
}

/// Stored credential. Replaced wholesale on password change.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub digest: Vec<u8>,
    pub salt: Vec<u8>,
}

impl Credential {
    /// Check a plaintext password against this credential.
    pub fn matches(&self, password: &str) -> bool {
        verify(password, &self.digest, &self.salt)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("digest", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

/// Derive a new credential from `password` with a freshly generated salt.
pub fn hash(password: &str) -> Result<Credential, HashError> {
    if password.is_empty() {
        return Err(HashError::EmptyCredential);
    }

    let mut salt = vec![0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let digest = keyed_digest(password, &salt)?;

    Ok(Credential { digest, salt })
}

/// Verify `password` against a stored digest/salt pair.
///
/// Returns `false` for any mismatch, including malformed stored values.
pub fn verify(password: &str, digest: &[u8], salt: &[u8]) -> bool {
    if salt.is_empty() || digest.len() != DIGEST_LEN {
        return false;
    }

    match keyed_digest(password, salt) {
        Ok(computed) => bool::from(computed.as_slice().ct_eq(digest)),
        Err(_) => false,
    }
}

/// Perform the same work as [`verify`] against a credential nobody holds.
///
/// Used for unknown accounts so a failed login costs the same either way.
pub fn verify_dummy(password: &str) -> bool {
    const DUMMY_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];
    const DUMMY_DIGEST: [u8; DIGEST_LEN] = [0; DIGEST_LEN];

    verify(password, &DUMMY_DIGEST, &DUMMY_SALT)
}

fn keyed_digest(password: &str, salt: &[u8]) -> Result<Vec<u8>, HashError> {
    let mut mac = HmacSha512::new_from_slice(salt)
        .map_err(|_| HashError::KeyRejected)?;
    mac.update(password.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
