//! Challenge token (nonce) management
//!
//! One process-wide nonce is advertised in every `WWW-Authenticate`
//! challenge. It is replaced at startup and on every rejection.
//!
//! # Concurrency
//!
//! Requests are served concurrently, so reads and rotations go through a
//! mutex. [`ChallengeToken::rotate`] installs the new value and returns that
//! same value while holding the lock; a rejection must advertise the returned
//! string rather than re-reading [`ChallengeToken::current`], which another
//! request may already have rotated again.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;

use crate::time;

/// Generate a fresh nonce: 32 lowercase hex characters
pub fn generate_nonce() -> String {
    let mut entropy = [0u8; 16];
    rand::thread_rng().fill(&mut entropy);

    let nanos = time::now().timestamp_nanos_opt().unwrap_or_default();

    let mut ctx = md5::Context::new();
    ctx.consume(entropy);
    ctx.consume(nanos.to_le_bytes());
    format!("{:x}", ctx.compute())
}

/// Build the `WWW-Authenticate` value for a challenge
pub fn challenge_header(realm: &str, nonce: &str) -> String {
    format!("Digest realm=\"{}\", nonce=\"{}\", qop=\"auth\"", realm, nonce)
}

/// Single-writer cell holding the advertised nonce
#[derive(Debug)]
pub struct ChallengeToken {
    current: Mutex<String>,
}

impl ChallengeToken {
    /// Create a cell seeded with a fresh nonce
    pub fn new() -> Self {
        Self::with_value(generate_nonce())
    }

    /// Create a cell with a known nonce (tests and fixtures)
    pub fn with_value(nonce: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(nonce.into()),
        }
    }

    /// Nonce currently in effect
    pub fn current(&self) -> String {
        self.lock().clone()
    }

    /// Replace the nonce and return the value that was installed
    pub fn rotate(&self) -> String {
        let mut guard = self.lock();
        let next = generate_nonce();
        *guard = next.clone();
        next
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        // The guarded String is always a complete nonce, so a poisoned lock
        // still holds a usable value
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ChallengeToken {
    fn default() -> Self {
        Self::new()
    }
}
