//! Error types for ray tracing.

use bathyray_profile::ProfileError;
use thiserror::Error;

/// Errors that can occur while tracing rays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// Launch angle is not strictly inside (-90°, 90°).
    #[error("launch angle {0}° is outside (-90°, 90°)")]
    InvalidLaunchAngle(f64),

    /// Source lies outside the water column.
    #[error("source depth {depth} m is outside the water column [{top}, {bottom}] m")]
    InvalidSourceDepth {
        /// Requested source depth (m).
        depth: f64,
        /// Profile top depth (m).
        top: f64,
        /// Profile bottom depth (m).
        bottom: f64,
    },

    /// Profile has no water slab to propagate through.
    #[error("profile has no propagating slabs")]
    NoWaterColumn,

    /// Ray produced an infinite or NaN vertex.
    #[error("ray launched at {angle_deg}° produced a non-finite vertex in slab {slab}")]
    NonFiniteVertex {
        /// Launch angle (degrees).
        angle_deg: f64,
        /// Slab the ray was in.
        slab: usize,
    },

    /// Ray did not reach its range limit within the step budget.
    #[error("ray launched at {angle_deg}° stalled at range {range} m after {steps} steps")]
    IterationLimit {
        /// Launch angle (degrees).
        angle_deg: f64,
        /// Steps taken.
        steps: usize,
        /// Range reached (m).
        range: f64,
    },

    /// Invalid tracer or fan settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Profile construction failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Result type for tracing operations.
pub type Result<T> = std::result::Result<T, TraceError>;
