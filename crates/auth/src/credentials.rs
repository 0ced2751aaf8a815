//! Password hashing (bcrypt).
//!
//! bcrypt only looks at the first 72 bytes of its input. Plaintext is cut to
//! 72 characters before hashing *and* before verifying so both sides see the
//! same prefix.

use thiserror::Error;

/// Longest plaintext prefix that takes part in hashing.
pub const MAX_PASSWORD_CHARS: usize = 72;

/// Work factor bounds accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("bcrypt cost {0} is outside {min}..={max}", min = MIN_COST, max = MAX_COST)]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Salted one-way password hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CredentialError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(bcrypt::hash(truncate(plaintext), self.cost)?)
    }

    /// Returns `false` for a wrong password and for an unparsable stored hash.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(truncate(plaintext), hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!("password hash could not be checked: {e}");
                false
            }
        }
    }
}

fn truncate(plaintext: &str) -> &str {
    match plaintext.char_indices().nth(MAX_PASSWORD_CHARS) {
        Some((idx, _)) => &plaintext[..idx],
        None => plaintext,
    }
}
