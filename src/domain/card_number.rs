//! Card number generation.
//!
//! Produces random fixed-length digit strings and retries until one is
//! unused, up to a bounded number of attempts. The caller supplies the
//! taken-check so generation can run against whatever store view holds
//! the enclosing transaction's isolation guarantee; the database unique
//! constraint on `wallets.card_number` remains the authoritative guard.

use std::future::Future;

use rand::Rng;

use crate::config::{CARD_NUMBER_LENGTH, MAX_CARD_NUMBER_ATTEMPTS};
use crate::errors::{AppError, AppResult};

/// Bounded-retry generator of unique card numbers.
#[derive(Debug, Clone, Copy)]
pub struct CardNumberGenerator {
    length: usize,
    max_attempts: u32,
}

impl Default for CardNumberGenerator {
    fn default() -> Self {
        Self {
            length: CARD_NUMBER_LENGTH,
            max_attempts: MAX_CARD_NUMBER_ATTEMPTS,
        }
    }
}

impl CardNumberGenerator {
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts,
        }
    }

    /// Generate a card number no existing wallet holds.
    ///
    /// `is_taken` is queried once per candidate. Collisions are retried
    /// transparently; after `max_attempts` collisions the generator fails
    /// with [`AppError::CardSpaceExhausted`] instead of recursing forever.
    pub async fn generate<F, Fut>(&self, is_taken: F) -> AppResult<String>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = AppResult<bool>>,
    {
        for _ in 0..self.max_attempts {
            let candidate = random_digits(self.length);
            if !is_taken(candidate.clone()).await? {
                return Ok(candidate);
            }
            tracing::debug!("card number collision, regenerating");
        }

        Err(AppError::CardSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Random digit string of the given length; leading zeros are legal.
fn random_digits(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
