#![warn(missing_docs)]

//! Stratified sound-speed profiles for underwater acoustic ray tracing.
//!
//! Converts raw bathythermograph samples (depth and temperature in any of
//! the supported units) into a [`SoundSpeedProfile`]: a stack of thin
//! horizontal slabs, each with a constant sound speed, bracketed by
//! reflecting boundary slabs at the surface and the sea floor.
//!
//! # Example
//!
//! ```
//! use bathyray_profile::build_profile;
//!
//! let depths = [0.0, 50.0, 100.0, 300.0];
//! let temps = [18.0, 17.5, 12.0, 9.0];
//! let profile = build_profile(&depths, &temps, Some("m"), Some("C")).unwrap();
//!
//! assert_eq!(profile.top_depth(), 0.0);
//! assert_eq!(profile.bottom_depth(), 300.0);
//! assert!(profile.slabs()[0].speed.is_boundary());
//! ```

pub mod builder;
pub mod error;
pub mod profile;
pub mod units;

pub use builder::{build_profile, Bathythermograph, DepthBand, ProfileBuilder, ProfileSettings};
pub use error::{ProfileError, Result};
pub use profile::{sound_speed, Slab, SlabSpeed, SoundSpeedProfile, REFLECTION_SENTINEL_SPEED};
pub use units::{DepthUnit, TemperatureUnit, MISSING_TEMPERATURE};
