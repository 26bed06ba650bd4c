//! Data models for usagegate

pub mod action;
pub mod limits;
pub mod usage;

pub use action::ActionKind;
pub use limits::{InvalidLimit, Limit, LimitField, LimitsConfig, Remaining, Tier};
pub use usage::{Dimension, UsageStats};
