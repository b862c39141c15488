//! Bounded retry of single driver calls.
//!
//! Serial links to drives and encoders drop the odd frame. A single call is
//! repeated a small fixed number of times; the whole convergence loop never
//! is.

use core::fmt::Display;

use tracing::warn;

use crate::error::Transient;

/// How many times a single driver call is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u8,
}

impl RetryPolicy {
    /// Policy with `attempts` tries in total (at least one).
    pub const fn new(attempts: u8) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
        }
    }

    /// Total number of tries.
    #[inline]
    pub const fn attempts(self) -> u8 {
        self.attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Run `op`, repeating it while it fails with a transient error.
///
/// Non-transient errors return immediately; once the attempts are used up
/// the last error is returned.
pub fn retry<T, E, F>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    E: Transient + Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.attempts => {
                warn!(call = what, attempt, error = %e, "transient fault, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
