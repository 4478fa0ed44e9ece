//! Credential generation
//!
//! Draws access and secret bytes from a cryptographically secure source.

use std::sync::Mutex;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

#[cfg(test)]
use mockall::automock;

use crate::domain::api_key::{AccessKey, KeyMaterial, SecretKey, ACCESS_KEY_BYTES, SECRET_KEY_BYTES};
use crate::domain::DomainError;

/// Source of fresh credential material
#[cfg_attr(test, automock)]
pub trait CredentialGenerator: Send + Sync {
    fn generate(&self) -> Result<KeyMaterial, DomainError>;
}

/// Generator backed by a cryptographic RNG (the OS source by default).
///
/// The `CryptoRng` bound keeps non-cryptographic generators out at compile
/// time. Access and secret bytes are drawn in sequence from the one shared
/// stream, so the stored RNG advances on every call.
#[derive(Debug, Default)]
pub struct RandomCredentialGenerator<R = OsRng> {
    rng: Mutex<R>,
}

impl RandomCredentialGenerator {
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl<R> RandomCredentialGenerator<R>
where
    R: RngCore + CryptoRng,
{
    /// Use a specific randomness source
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

fn fill<R: RngCore>(rng: &mut R, len: usize, what: &str) -> Result<Vec<u8>, DomainError> {
    let mut bytes = vec![0u8; len];
    rng.try_fill_bytes(&mut bytes).map_err(|e| {
        DomainError::entropy_unavailable(format!("Unable to generate {}: {}", what, e))
    })?;
    Ok(bytes)
}

impl<R> CredentialGenerator for RandomCredentialGenerator<R>
where
    R: RngCore + CryptoRng + Send,
{
    fn generate(&self) -> Result<KeyMaterial, DomainError> {
        let (access_bytes, secret_bytes) = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| DomainError::entropy_unavailable("Randomness source poisoned"))?;

            let access_bytes = fill(&mut *rng, ACCESS_KEY_BYTES, "access key")?;
            let secret_bytes = fill(&mut *rng, SECRET_KEY_BYTES, "secret key")?;
            (access_bytes, secret_bytes)
        };

        let access_key = AccessKey::new(URL_SAFE.encode(&access_bytes))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(KeyMaterial {
            access_key,
            secret: SecretKey::new(secret_bytes),
        })
    }
}
