use crate::error::{ApiError, Result};
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, Params, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// One-way transform applied to passwords before they are stored.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// Checks a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Salted Argon2id, encoded as a PHC string.
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom memory (KiB) and iteration cost.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| ApiError::PasswordHash(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::PasswordHash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(64, 1).unwrap()
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hashed = hasher().hash("hunter2").unwrap();
        assert!(!hashed.contains("hunter2"));
        assert!(hashed.starts_with("$argon2id$"));
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        let hasher = hasher();
        let hashed = hasher.hash("hunter2").unwrap();
        assert!(hasher.verify("hunter2", &hashed));
        assert!(!hasher.verify("hunter3", &hashed));
        assert!(!hasher.verify("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn rejects_impossible_cost() {
        assert!(Argon2Hasher::with_cost(0, 0).is_err());
    }
}
