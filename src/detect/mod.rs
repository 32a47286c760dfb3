//! Typology detectors.
//!
//! Each detector is a pure function over shared read-only indices. All
//! detectors validate their configuration up front and fail fast with a
//! [`ConfigError`]; malformed input records never produce errors, they
//! are excluded when the indices are built.

use chrono::Duration;
use rust_decimal::Decimal;
use thiserror::Error;

pub mod centrality;
pub mod layering;
pub mod network;
pub mod report;
pub mod round_trip;
pub mod shell_company;
pub mod structuring;

/// Configuration-range errors.
///
/// These indicate a caller programming error and abort the invocation
/// before any detection runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("time window must be positive, got {0:?}")]
    NonPositiveWindow(Duration),
    #[error("reporting threshold must be positive, got {0}")]
    NonPositiveThreshold(Decimal),
    #[error("buffer must be positive and not exceed the threshold (threshold {threshold}, buffer {buffer})")]
    InvalidBuffer {
        threshold: Decimal,
        buffer: Decimal,
    },
    #[error("chain length bound must be at least 2, got {0}")]
    ChainLengthTooSmall(usize),
    #[error("amount variance must be within 0..=1, got {0}")]
    InvalidVariance(Decimal),
    #[error("recency cutoff must be positive, got {0:?}")]
    NonPositiveRecency(Duration),
    #[error("score threshold must be within 1..=100, got {0}")]
    InvalidScoreThreshold(u32),
    #[error("minimum component size must be at least 2, got {0}")]
    ComponentSizeTooSmall(usize),
}
