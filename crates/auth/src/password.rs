//! Credential hashing (bcrypt).

use thiserror::Error;

/// Largest plaintext bcrypt digests without silently truncating.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("password is {len} bytes; at most {max} are supported")]
    InputTooLong { len: usize, max: usize },

    #[error("password hashing failed: {0}")]
    Backend(String),
}

/// Salted one-way password hasher.
///
/// Every call to [`PasswordHasher::hash`] draws a fresh salt, so hashing the
/// same plaintext twice yields two different strings that both verify.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::InputTooLong {
                len: plaintext.len(),
                max: MAX_PASSWORD_BYTES,
            });
        }

        bcrypt::hash(plaintext, self.cost).map_err(|e| HashError::Backend(e.to_string()))
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// Fails closed: a malformed hash or an over-long plaintext is a mismatch.
    /// The digest comparison inside bcrypt is constant-time.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
