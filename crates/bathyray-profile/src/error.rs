//! Error types for profile construction.

use thiserror::Error;

/// Errors that can occur while building a sound-speed profile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// No samples were supplied.
    #[error("profile has no samples")]
    EmptyProfile,

    /// Depth and temperature sequences are not index-aligned.
    #[error("depth and temperature sequences differ in length: {depths} depths, {temperatures} temperatures")]
    LengthMismatch {
        /// Number of depth samples.
        depths: usize,
        /// Number of temperature samples.
        temperatures: usize,
    },

    /// Every temperature sample is missing.
    #[error("profile has no valid temperature samples")]
    NoValidSamples,

    /// Two valid samples do not descend, so the interval between them has no thickness.
    #[error("sample {index} at depth {depth} m does not lie below the previous valid sample at {previous} m")]
    NonIncreasingDepth {
        /// Index of the offending raw sample.
        index: usize,
        /// Depth of the offending sample (m).
        depth: f64,
        /// Depth of the previous valid sample (m).
        previous: f64,
    },

    /// Interpolated sound speed dropped to zero or below.
    #[error("slab {slab} has non-positive sound speed {speed} m/s")]
    NonPositiveSpeed {
        /// Slab index.
        slab: usize,
        /// Offending speed (m/s).
        speed: f64,
    },

    /// Subdivision produced more slabs than allowed.
    #[error("profile subdivision exceeded {limit} slabs")]
    SlabLimit {
        /// Configured slab ceiling.
        limit: usize,
    },

    /// A hand-assembled slab table is malformed.
    #[error("invalid slab {index}: {reason}")]
    InvalidSlab {
        /// Slab index.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Invalid builder settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
