//! Foundational immutable types consumed by the detection engine.

pub mod entity;
pub mod relationship;
pub mod transaction;
