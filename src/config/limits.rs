//! Safe operating envelope.

/// The physical range within which an axis may move without damaging the
/// apparatus. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRange {
    /// Minimum allowed position.
    pub min: f64,

    /// Maximum allowed position.
    pub max: f64,
}

impl SafeRange {
    /// Create a new safe range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if the range is valid (min < max, both finite).
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Check if a position is within the envelope.
    ///
    /// NaN is never inside.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }
}
