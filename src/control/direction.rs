//! Direction of travel.

/// Direction of axis travel in physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Towards larger positions.
    Positive,
    /// Towards smaller positions.
    Negative,
}

impl Direction {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}
