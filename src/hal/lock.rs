//! Exclusive ownership of encoder wiring.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::EncoderError;

/// Non-blocking exclusive lock guarding one physical encoder.
///
/// Only one session may own the encoder wiring at a time. Encoder
/// implementations acquire it in `connect` and release it in `disconnect`;
/// a second owner fails immediately with [`EncoderError::Busy`].
#[derive(Debug, Default)]
pub struct EncoderLock {
    held: AtomicBool,
}

impl EncoderLock {
    /// Create an unheld lock. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the lock without blocking.
    pub fn try_acquire(&self) -> Result<(), EncoderError> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| ())
            .map_err(|_| EncoderError::Busy)
    }

    /// Give the lock back.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// Whether some owner holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}
