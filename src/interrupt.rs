//! Cooperative cancellation.
//!
//! Blocking only happens in poll sleeps and encoder reads. Both check the
//! cancellation token right before and right after blocking, so a request
//! is honoured within one poll interval.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::error::AxisError;

/// Capability of being asked to stop.
pub trait Cancellable {
    /// Ask the current operation to stop at its next suspension point.
    fn request_cancel(&self);

    /// Whether a cancellation is pending.
    fn is_cancel_requested(&self) -> bool;

    /// Consume a pending request. Returns `true` if there was one.
    fn take_cancel(&self) -> bool;
}

/// Cancellation flag shared between an operator and one axis controller.
///
/// A request stays pending until the controller reaches a suspension point.
/// If the axis is idle when the request is made, the next operation on that
/// axis consumes it and fails with [`AxisError::Cancelled`] before moving.
/// Call [`reset`](Self::reset) to drop a stale request first.
#[derive(Debug, Default)]
pub struct Interruptor {
    requested: AtomicBool,
}

impl Interruptor {
    /// Create a flag with no pending request. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Drop any pending request without cancelling anything.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

impl Cancellable for Interruptor {
    fn request_cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    fn is_cancel_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    fn take_cancel(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

impl<T: Cancellable + ?Sized> Cancellable for &T {
    #[inline]
    fn request_cancel(&self) {
        T::request_cancel(self)
    }

    #[inline]
    fn is_cancel_requested(&self) -> bool {
        T::is_cancel_requested(self)
    }

    #[inline]
    fn take_cancel(&self) -> bool {
        T::take_cancel(self)
    }
}

#[cfg(feature = "alloc")]
impl<T: Cancellable + ?Sized> Cancellable for alloc::sync::Arc<T> {
    #[inline]
    fn request_cancel(&self) {
        T::request_cancel(self)
    }

    #[inline]
    fn is_cancel_requested(&self) -> bool {
        T::is_cancel_requested(self)
    }

    #[inline]
    fn take_cancel(&self) -> bool {
        T::take_cancel(self)
    }
}

/// Poll timer whose sleeps can be cut short by a cancellation request.
///
/// Also keeps the operation clock: the total time spent sleeping since the
/// last [`restart`](Self::restart).
pub struct InterruptibleDelay<D, C> {
    delay: D,
    token: C,
    elapsed: Duration,
}

impl<D: DelayNs, C: Cancellable> InterruptibleDelay<D, C> {
    /// Wrap a delay provider and a cancellation token.
    pub fn new(delay: D, token: C) -> Self {
        Self {
            delay,
            token,
            elapsed: Duration::ZERO,
        }
    }

    /// The cancellation token.
    #[inline]
    pub fn token(&self) -> &C {
        &self.token
    }

    /// Time slept since the last restart.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reset the operation clock.
    #[inline]
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Suspension point: fail with [`AxisError::Cancelled`] if a request
    /// is pending. The request is consumed.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), AxisError> {
        if self.token.take_cancel() {
            Err(AxisError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, checking for cancellation on both sides.
    pub fn sleep(&mut self, duration: Duration) -> Result<(), AxisError> {
        self.checkpoint()?;
        let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(micros);
        self.elapsed = self.elapsed.saturating_add(duration);
        self.checkpoint()
    }
}
