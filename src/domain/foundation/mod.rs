//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::{IdError, SessionId, StepId, UserId};
pub use timestamp::Timestamp;
