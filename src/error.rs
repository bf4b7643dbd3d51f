//! Error types for tracker construction and sequence driving.
//!
//! Runtime operations ([`advance`](crate::Tracker::advance),
//! [`goto`](crate::Bounded::goto), ...) never fail: out-of-range input is clamped or
//! ignored. Errors only surface where a caller hands the crate something it cannot
//! represent faithfully.

use compact_str::CompactString;
use thiserror::Error;

/// Errors raised while validating a [`TrackerConfig`](crate::TrackerConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The smoothing window must be a finite, strictly positive number.
    #[error("avg_window must be finite and positive, got {0}")]
    InvalidAvgWindow(f64),

    /// A recognized option was given a value of the wrong type.
    #[error("option '{key}' expects {expected}")]
    UnexpectedType {
        /// The offending option name.
        key: CompactString,
        /// Human readable description of the accepted type.
        expected: &'static str,
    },

    /// A recognized count option was given a negative number.
    #[error("option '{key}' must not be negative")]
    NegativeValue {
        /// The offending option name.
        key: CompactString,
    },
}

/// Errors raised when wrapping a sequence with a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriveError {
    /// The tracker already drove a sequence; its state cannot be reused for another.
    #[error("tracker has already driven a sequence")]
    AlreadyDriven,
}
