//! Salted one-way password hashing.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 600_000;
/// Salt length in bytes.
pub const SALT_LENGTH: usize = 32;
/// Derived hash length in bytes.
pub const HASH_LENGTH: usize = 32;

/// A salted PBKDF2-SHA256 password hash. The plain password is never
/// stored and cannot be recovered from this value.
#[derive(Clone)]
pub struct PasswordHash {
    salt: [u8; SALT_LENGTH],
    hash: [u8; HASH_LENGTH],
}

impl PasswordHash {
    /// Derives a hash from a password with a fresh random salt.
    #[must_use]
    pub fn derive(password: &str) -> Self {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = derive_with_salt(password, &salt);
        Self { salt, hash }
    }

    /// Verifies a candidate password in constant time.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive_with_salt(password, &self.salt);
        self.hash.ct_eq(&candidate).into()
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash").finish_non_exhaustive()
    }
}

fn derive_with_salt(password: &str, salt: &[u8; SALT_LENGTH]) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}
