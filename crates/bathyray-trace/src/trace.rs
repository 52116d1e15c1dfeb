//! Layered-medium ray shooting.
//!
//! The ray steps one slab at a time. Horizontal range advances by
//! `thickness / |b|` per slab, which is valid because the medium varies only
//! with depth. At each slab face the paraxial form of Snell's law,
//! `cos2b = (v1 / v0) * (1 - b²/2)`, decides between three outcomes:
//!
//! - `cos2b >= 1` (or the ray is at the floor): reflect at the current face.
//! - the slab after next cannot be entered: refract in, turn at its far face.
//! - otherwise: refract into the next slab with `b = ±sqrt(2 (1 - cos2b))`.

use bathyray_profile::{SlabSpeed, SoundSpeedProfile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TraceError};
use crate::ray::{RayPath, ReflectionKind};

/// Launch angles smaller than this (degrees) count as horizontal.
pub const MIN_LAUNCH_ANGLE_DEG: f64 = 1e-6;

/// Ray tracing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Default source depth below the top of the water column (m).
    pub default_source_offset: f64,
    /// Default range limit (m).
    pub max_range: f64,
    /// Angle traced in place of a horizontal launch (degrees).
    pub horizontal_launch_deg: f64,
    /// Slab steps allowed before a ray is declared stalled.
    pub max_steps: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            default_source_offset: 10.0,
            max_range: 20_000.0,
            horizontal_launch_deg: 3.0,
            max_steps: 1_000_000,
        }
    }
}

impl TraceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.default_source_offset >= 0.0) {
            return Err(TraceError::InvalidSettings(
                "default_source_offset must not be negative".into(),
            ));
        }
        if !(self.max_range > 0.0 && self.max_range.is_finite()) {
            return Err(TraceError::InvalidSettings(
                "max_range must be positive and finite".into(),
            ));
        }
        if !(self.horizontal_launch_deg.abs() >= MIN_LAUNCH_ANGLE_DEG
            && self.horizontal_launch_deg.abs() < 90.0)
        {
            return Err(TraceError::InvalidSettings(
                "horizontal_launch_deg must be non-zero and inside (-90, 90)".into(),
            ));
        }
        if self.max_steps == 0 {
            return Err(TraceError::InvalidSettings("max_steps must be positive".into()));
        }
        Ok(())
    }
}

/// Traces single rays through a [`SoundSpeedProfile`].
///
/// The tracer never mutates the profile, so one profile can serve any number
/// of concurrent traces.
#[derive(Debug, Clone, Default)]
pub struct RayTracer {
    settings: TraceSettings,
}

impl RayTracer {
    /// Create a tracer with validated settings.
    pub fn new(settings: TraceSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Tracer settings.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Source depth to use for `requested`, or the default below the top.
    ///
    /// The default is clamped to the floor; explicit depths outside the
    /// water column are rejected.
    pub fn source_depth(&self, profile: &SoundSpeedProfile, requested: Option<f64>) -> Result<f64> {
        let top = profile.top_depth();
        let bottom = profile.bottom_depth();
        match requested {
            None => Ok((top + self.settings.default_source_offset).min(bottom)),
            Some(depth) if depth >= top && depth <= bottom => Ok(depth),
            Some(depth) => Err(TraceError::InvalidSourceDepth { depth, top, bottom }),
        }
    }

    /// Trace one ray.
    ///
    /// `launch_angle_deg` is positive downward and must lie strictly inside
    /// (-90, 90); a horizontal launch is replaced by
    /// [`TraceSettings::horizontal_launch_deg`]. The ray is followed until its
    /// range reaches `max_range` (default [`TraceSettings::max_range`]).
    pub fn trace(
        &self,
        profile: &SoundSpeedProfile,
        launch_angle_deg: f64,
        source_depth: Option<f64>,
        max_range: Option<f64>,
    ) -> Result<RayPath> {
        if !launch_angle_deg.is_finite() || launch_angle_deg.abs() >= 90.0 {
            return Err(TraceError::InvalidLaunchAngle(launch_angle_deg));
        }
        let angle_deg = if launch_angle_deg.abs() < MIN_LAUNCH_ANGLE_DEG {
            debug!(
                substitute = self.settings.horizontal_launch_deg,
                "horizontal launch replaced"
            );
            self.settings.horizontal_launch_deg
        } else {
            launch_angle_deg
        };
        let max_range = max_range.unwrap_or(self.settings.max_range);
        if !(max_range > 0.0 && max_range.is_finite()) {
            return Err(TraceError::InvalidSettings(format!(
                "max_range {max_range} must be positive and finite"
            )));
        }
        let source = self.source_depth(profile, source_depth)?;

        let slabs = profile.slabs();
        if slabs.len() < 3 {
            return Err(TraceError::NoWaterColumn);
        }
        let last_water = slabs.len() - 2;

        // Find the slab whose lower face is at or below the source.
        let mut i = 0;
        let mut y = profile.top_depth();
        loop {
            i += 1;
            y += slabs[i].thickness;
            if y >= source || i >= last_water {
                break;
            }
        }
        // Upward rays start from the upper face of that slab instead.
        if angle_deg < 0.0 {
            y -= slabs[i].thickness;
        }

        let mut b = angle_deg.to_radians();
        let mut sgn: isize = if b < 0.0 { -1 } else { 1 };
        let mut v0 = slabs[i].speed.value().ok_or(TraceError::NoWaterColumn)?;
        let bottom = profile.bottom_depth();

        let mut path = RayPath::new(angle_deg, source);
        let mut x = ((source - y) / b.abs().tan()).abs();
        path.push(x, y);

        let mut steps = 0;
        loop {
            let next = i as isize + sgn;
            let crossing = match profile.speed(next) {
                SlabSpeed::Propagating(v1) => Some((v1, (v1 / v0) * (1.0 - b * b / 2.0))),
                SlabSpeed::Boundary => None,
            };

            match crossing {
                Some((v1, cos2b)) if cos2b < 1.0 && y < bottom => {
                    let turns = match profile.speed(next + sgn) {
                        SlabSpeed::Propagating(v2) => v2 * cos2b / v1 >= 1.0,
                        SlabSpeed::Boundary => true,
                    };
                    if turns {
                        let dz = slabs[next as usize].thickness;
                        let apex_range = x + 2.0 * dz / b.abs();
                        let apex_depth = y + sgn as f64 * dz;
                        path.push(apex_range, apex_depth);
                        path.reflect(ReflectionKind::Turning, apex_range, apex_depth, b);
                        x += 4.0 * dz / b.abs();
                        b = -b;
                        sgn = -sgn;
                    } else {
                        b = sgn as f64 * (2.0 * (1.0 - cos2b)).sqrt();
                        i = next as usize;
                        v0 = v1;
                    }
                }
                _ => {
                    path.reflect(ReflectionKind::Immediate, x, y, b);
                    b = -b;
                    sgn = -sgn;
                }
            }

            let dz = slabs[i].thickness;
            y += sgn as f64 * dz;
            x += dz / b.abs();
            if !(x.is_finite() && y.is_finite()) {
                return Err(TraceError::NonFiniteVertex {
                    angle_deg,
                    slab: i,
                });
            }
            path.push(x, y);

            steps += 1;
            if x >= max_range {
                break;
            }
            if steps >= self.settings.max_steps {
                return Err(TraceError::IterationLimit {
                    angle_deg,
                    steps,
                    range: x,
                });
            }
        }

        Ok(path)
    }
}

/// Trace one ray with default settings.
pub fn trace_ray(
    profile: &SoundSpeedProfile,
    launch_angle_deg: f64,
    source_depth: Option<f64>,
    max_range: Option<f64>,
) -> Result<RayPath> {
    RayTracer::default().trace(profile, launch_angle_deg, source_depth, max_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use bathyray_profile::{build_profile, Slab};

    fn slopes(path: &RayPath, from: usize, to: usize) -> Vec<f64> {
        path.vertices()[from..=to]
            .windows(2)
            .map(|w| (w[1].depth - w[0].depth) / (w[1].range - w[0].range))
            .collect()
    }

    fn assert_monotonic(path: &RayPath) {
        for w in path.vertices().windows(2) {
            assert!(w[1].range >= w[0].range, "range decreased: {:?}", w);
        }
    }

    /// Speed rises 0.5 m/s per metre, a surface duct.
    fn surface_duct() -> SoundSpeedProfile {
        let mut slabs = vec![Slab::boundary(1.0)];
        slabs.extend((0..200).map(|k| Slab::propagating(1.0, 1500.0 + 0.5 * k as f64)));
        slabs.push(Slab::boundary(1.0));
        SoundSpeedProfile::from_slabs(0.0, 200.0, slabs).unwrap()
    }

    #[test]
    fn test_path_starts_at_source() {
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        let path = trace_ray(&profile, 10.0, Some(25.0), Some(500.0)).unwrap();
        assert_eq!(path.vertices()[0].range, 0.0);
        assert_eq!(path.vertices()[0].depth, 25.0);
        assert!(path.final_range() >= 500.0);
        assert_monotonic(&path);
    }

    #[test]
    fn test_surface_reflection_symmetry() {
        let theta = 10.0_f64;
        let b = theta.to_radians();
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        let path = trace_ray(&profile, -theta, Some(20.0), Some(300.0)).unwrap();

        let first = path.reflections()[0];
        assert_eq!(first.kind, ReflectionKind::Turning);
        assert_abs_diff_eq!(first.depth, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.angle, -b, epsilon = 1e-9);

        let apex = path
            .vertices()
            .iter()
            .position(|v| v.depth.abs() < 1e-9)
            .unwrap();
        for s in slopes(&path, 1, apex - 1) {
            assert_abs_diff_eq!(s, -b, epsilon = 1e-9);
        }
        for s in slopes(&path, apex + 1, path.len() - 1) {
            assert_abs_diff_eq!(s, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_isothermal_runs_straight_to_bottom() {
        let profile = build_profile(&[0.0, 100.0, 200.0], &[10.0, 10.0, 10.0], None, None).unwrap();
        let b0 = 30.0_f64.to_radians();
        let path = trace_ray(&profile, 30.0, None, Some(2000.0)).unwrap();
        assert_eq!(path.source_depth(), 10.0);

        let first = path.reflections()[0];
        assert!(first.depth >= profile.bottom_depth() - 1e-9);
        assert!(first.angle > 0.0);

        let end = path
            .vertices()
            .iter()
            .position(|v| v.range >= first.range)
            .unwrap();
        for s in slopes(&path, 1, end - 1) {
            assert!((s - b0).abs() / b0 < 0.02, "slope {s} bent away from {b0}");
        }
        assert_monotonic(&path);
    }

    #[test]
    fn test_surface_duct_traps_shallow_ray() {
        let profile = surface_duct();
        let path = trace_ray(&profile, 1.0, Some(10.0), Some(5000.0)).unwrap();
        let first = path.reflections()[0];
        assert_eq!(first.kind, ReflectionKind::Immediate);
        assert!(first.depth > 5.0 && first.depth < 20.0);
        assert!(path.bounds().max_depth < 50.0);
        assert!(path.reflections().len() > 2);
        assert_monotonic(&path);
    }

    #[test]
    fn test_upward_ray_starts_at_upper_face() {
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        let path = trace_ray(&profile, -5.0, Some(30.5), Some(100.0)).unwrap();
        // Source sits in slab 31 spanning 30..31 m.
        assert_abs_diff_eq!(path.vertices()[1].depth, 30.0, epsilon = 1e-9);
        assert!(path.vertices()[2].depth < path.vertices()[1].depth);
    }

    #[test]
    fn test_horizontal_launch_substituted() {
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        let path = trace_ray(&profile, 0.0, None, Some(1000.0)).unwrap();
        assert_eq!(path.launch_angle_deg(), 3.0);
        assert!(path.vertices().iter().all(|v| v.range.is_finite()));
    }

    #[test]
    fn test_invalid_angles() {
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        for angle in [90.0, -90.0, 120.0, f64::NAN] {
            assert!(matches!(
                trace_ray(&profile, angle, None, None),
                Err(TraceError::InvalidLaunchAngle(_))
            ));
        }
    }

    #[test]
    fn test_invalid_source_depth() {
        let profile = SoundSpeedProfile::uniform(10.0, 100.0, 1500.0, 1.0).unwrap();
        let err = trace_ray(&profile, 5.0, Some(5.0), None).unwrap_err();
        assert!(matches!(err, TraceError::InvalidSourceDepth { depth, .. } if depth == 5.0));
        assert!(trace_ray(&profile, 5.0, Some(150.0), None).is_err());
    }

    #[test]
    fn test_default_source_clamped() {
        let profile = SoundSpeedProfile::uniform(0.0, 4.0, 1500.0, 1.0).unwrap();
        let tracer = RayTracer::default();
        assert_eq!(tracer.source_depth(&profile, None).unwrap(), 4.0);
        let profile = SoundSpeedProfile::uniform(5.0, 100.0, 1500.0, 1.0).unwrap();
        assert_eq!(tracer.source_depth(&profile, None).unwrap(), 15.0);
    }

    #[test]
    fn test_iteration_limit() {
        let profile = SoundSpeedProfile::uniform(0.0, 100.0, 1500.0, 1.0).unwrap();
        let tracer = RayTracer::new(TraceSettings {
            max_steps: 5,
            ..Default::default()
        })
        .unwrap();
        let err = tracer.trace(&profile, 45.0, None, None).unwrap_err();
        assert!(matches!(err, TraceError::IterationLimit { steps: 5, .. }));
    }

    #[test]
    fn test_bottom_reflection() {
        let profile = SoundSpeedProfile::uniform(0.0, 50.0, 1500.0, 1.0).unwrap();
        let path = trace_ray(&profile, 20.0, Some(10.0), Some(400.0)).unwrap();
        let first = path.reflections()[0];
        assert_abs_diff_eq!(first.depth, 50.0, epsilon = 1e-9);
        assert!(path.bounds().max_depth <= 50.0 + 1e-9);
        assert!(path.bounds().min_depth >= 0.0 - 1e-9);
    }

    #[test]
    fn test_no_water_column() {
        let profile = build_profile(&[0.0], &[12.0], None, None).unwrap();
        assert_eq!(
            trace_ray(&profile, 5.0, Some(0.0), None),
            Err(TraceError::NoWaterColumn)
        );
    }

    #[test]
    fn test_invalid_settings() {
        let settings = TraceSettings {
            horizontal_launch_deg: 0.0,
            ..Default::default()
        };
        assert!(RayTracer::new(settings).is_err());
        let settings = TraceSettings {
            max_range: -1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
