//! Authentication module
//!
//! Bcrypt hashing primitive, field policy and password verification.

mod password;
pub mod policy;

pub use password::{embedded_cost, BcryptHasher, PasswordHasher, SALT_LEN};
pub use policy::{classify, resolve_digest_field, resolve_hash_cost, PasswordAssignment};

use crate::error::{password_mismatch, AuthError};
use serde_json::Value;
use tracing::{debug, warn};

/// Verify `plaintext` against a stored digest.
///
/// Empty input and a missing digest fail without touching the hasher. Errors
/// from the hasher (malformed digest and the like) are reported as a plain
/// mismatch so callers cannot tell them apart from a wrong password.
pub async fn verify_digest(
    hasher: &dyn PasswordHasher,
    digest: Option<&Value>,
    plaintext: Option<&str>,
) -> Result<(), AuthError> {
    let digest = match digest {
        Some(Value::String(d)) if !d.is_empty() => d.as_str(),
        _ => {
            debug!("No stored digest; rejecting");
            return Err(password_mismatch());
        }
    };

    let plaintext = match plaintext {
        Some(p) if !policy::is_empty(Some(p)) => p,
        _ => {
            debug!("Empty password supplied; rejecting");
            return Err(password_mismatch());
        }
    };

    match hasher.compare(plaintext, digest).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(password_mismatch()),
        Err(e) => {
            warn!(error = %e, "Digest comparison failed; treating as mismatch");
            Err(password_mismatch())
        }
    }
}
