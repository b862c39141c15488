//! Control module for axis-servo.
//!
//! Step proposals, speed tiers, loop state and the convergence loop.

mod convergence;
mod direction;
mod proposal;
mod speed;
mod state;

pub use convergence::{check_target, Convergence, ConvergenceLoop};
pub use direction::Direction;
pub use proposal::{backlash_correction, propose, proposal, Proposal};
pub use speed::SpeedTier;
pub use state::{AxisState, Phase, PositionSample};
