//! Password hashing and verification
//!
//! Uses bcrypt for secure password hashing. The async variants run on tokio's
//! blocking pool so a slow cost factor never stalls the runtime.

use crate::error::HashError;
use async_trait::async_trait;
use bcrypt::{hash_with_salt, verify, HashParts, Version};
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of a bcrypt salt in bytes
pub const SALT_LEN: usize = 16;

/// Hash primitive used by secure password models.
///
/// Implementations must be stateless per call: the same hasher is shared by
/// every instance of every model type it was registered with.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext, blocking the calling thread
    fn hash_blocking(&self, plaintext: &str, cost: u32) -> Result<String, HashError>;

    /// Hash a plaintext without blocking the runtime
    async fn hash(&self, plaintext: &str, cost: u32) -> Result<String, HashError>;

    /// Compare a plaintext against a digest
    async fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, HashError>;
}

/// Bcrypt-backed [`PasswordHasher`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher;

impl BcryptHasher {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh random salt
    pub fn gen_salt() -> Result<[u8; SALT_LEN], HashError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| HashError::Salt(e.to_string()))?;
        Ok(salt)
    }

    fn hash_with_fresh_salt(plaintext: &str, cost: u32) -> Result<String, HashError> {
        let salt = Self::gen_salt()?;
        let parts = hash_with_salt(plaintext, cost, salt)?;
        Ok(parts.format_for_version(Version::TwoB))
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    fn hash_blocking(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
        Self::hash_with_fresh_salt(plaintext, cost)
    }

    async fn hash(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || Self::hash_with_fresh_salt(&plaintext, cost)).await?
    }

    async fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify(plaintext, &digest)).await??;
        Ok(matches)
    }
}

/// Read the cost factor embedded in a bcrypt digest (`$2b$12$...`)
pub fn embedded_cost(digest: &str) -> Option<u32> {
    digest.parse::<HashParts>().ok().map(|parts| parts.get_cost())
}
