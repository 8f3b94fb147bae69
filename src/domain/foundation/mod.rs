//! Shared value objects used across the domain.

mod ids;
mod timestamp;

pub use ids::{IdError, UserId};
pub use timestamp::Timestamp;
