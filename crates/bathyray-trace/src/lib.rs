#![warn(missing_docs)]

//! Acoustic ray tracing through stratified sound-speed profiles.
//!
//! Rays are shot through the slabs of a [`SoundSpeedProfile`] using the
//! small-angle form of Snell's law. Range is accumulated slab by slab, and
//! rays reflect off the surface, the sea floor, and any slab they cannot
//! enter.
//!
//! # Architecture
//!
//! - [`RayTracer`] - traces a single launch angle into a [`RayPath`]
//! - [`FanGenerator`] - traces a symmetric set of angles into a [`RayFan`]
//! - [`RayPath`] - `(range, depth)` vertices plus reflection events
//!
//! # Example
//!
//! ```
//! use bathyray_profile::build_profile;
//! use bathyray_trace::{generate_fan, trace_ray};
//!
//! let profile = build_profile(
//!     &[0.0, 50.0, 100.0, 300.0],
//!     &[18.0, 17.5, 12.0, 9.0],
//!     None,
//!     None,
//! )
//! .unwrap();
//!
//! let ray = trace_ray(&profile, 5.0, Some(20.0), Some(5000.0)).unwrap();
//! assert_eq!(ray.vertices()[0].depth, 20.0);
//!
//! let fan = generate_fan(&profile, 0.0, 5, 10.0, None, Some(5000.0)).unwrap();
//! assert_eq!(fan.len(), 5);
//! ```

pub mod error;
pub mod fan;
mod ray;
pub mod trace;

pub use bathyray_profile::SoundSpeedProfile;
pub use error::{Result, TraceError};
pub use fan::{generate_fan, in_launch_window, FanGenerator, FanSettings, RayFan};
pub use ray::{PathBounds, RayPath, RayVertex, Reflection, ReflectionKind};
pub use trace::{trace_ray, RayTracer, TraceSettings, MIN_LAUNCH_ANGLE_DEG};
