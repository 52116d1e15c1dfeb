//! Fans of rays launched about a central bearing.

use bathyray_profile::SoundSpeedProfile;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TraceError};
use crate::ray::RayPath;
use crate::trace::RayTracer;

/// Fan geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanSettings {
    /// Central launch angle (degrees, positive downward).
    pub central_angle_deg: f64,
    /// Number of candidate rays, spread symmetrically about the centre.
    pub ray_count: usize,
    /// Angle between neighbouring rays (degrees).
    pub angular_spacing_deg: f64,
    /// Source depth (m); the tracer default when absent.
    pub source_depth: Option<f64>,
    /// Range limit (m); the tracer default when absent.
    pub max_range: Option<f64>,
}

impl Default for FanSettings {
    fn default() -> Self {
        Self {
            central_angle_deg: 0.0,
            ray_count: 11,
            angular_spacing_deg: 2.0,
            source_depth: None,
            max_range: None,
        }
    }
}

impl FanSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.central_angle_deg.is_finite() {
            return Err(TraceError::InvalidSettings(
                "central_angle_deg must be finite".into(),
            ));
        }
        if !(self.angular_spacing_deg.is_finite() && self.angular_spacing_deg > 0.0) {
            return Err(TraceError::InvalidSettings(
                "angular_spacing_deg must be positive".into(),
            ));
        }
        Ok(())
    }

    /// All candidate launch angles, lowest first, before window filtering.
    ///
    /// With an even `ray_count` the centre itself falls between two rays.
    pub fn candidate_angles(&self) -> Vec<f64> {
        let half = (self.ray_count as f64 - 1.0) / 2.0;
        (0..self.ray_count)
            .map(|k| self.central_angle_deg + (k as f64 - half) * self.angular_spacing_deg)
            .collect()
    }
}

/// Launch angles the tracer can follow: strictly inside (-90°, 90°).
#[inline]
pub fn in_launch_window(angle_deg: f64) -> bool {
    angle_deg > -90.0 && angle_deg < 90.0
}

/// Rays traced for one fan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RayFan {
    settings: FanSettings,
    rays: Vec<RayPath>,
    skipped_angles: Vec<f64>,
}

impl RayFan {
    /// Geometry the fan was generated with.
    pub fn settings(&self) -> &FanSettings {
        &self.settings
    }

    /// Traced rays in order of increasing launch angle.
    pub fn rays(&self) -> &[RayPath] {
        &self.rays
    }

    /// Candidate angles left out because they fall outside the launch window.
    pub fn skipped_angles(&self) -> &[f64] {
        &self.skipped_angles
    }

    /// Number of traced rays.
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    /// True if no candidate angle was traceable.
    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }
}

/// Generates ray fans by tracing every candidate angle with one tracer.
#[derive(Debug, Clone, Default)]
pub struct FanGenerator {
    tracer: RayTracer,
}

impl FanGenerator {
    /// Create a generator around a tracer.
    pub fn new(tracer: RayTracer) -> Self {
        Self { tracer }
    }

    /// The tracer used for each ray.
    pub fn tracer(&self) -> &RayTracer {
        &self.tracer
    }

    /// Trace every candidate angle inside the launch window.
    ///
    /// Out-of-window angles are skipped silently. Rays are traced in parallel;
    /// the first tracing error aborts the fan.
    pub fn generate(&self, profile: &SoundSpeedProfile, settings: &FanSettings) -> Result<RayFan> {
        settings.validate()?;

        let (angles, skipped_angles): (Vec<f64>, Vec<f64>) = settings
            .candidate_angles()
            .into_iter()
            .partition(|&a| in_launch_window(a));
        if !skipped_angles.is_empty() {
            debug!(?skipped_angles, "skipping rays outside the launch window");
        }

        let rays = angles
            .par_iter()
            .map(|&angle| {
                self.tracer
                    .trace(profile, angle, settings.source_depth, settings.max_range)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(rays = rays.len(), "generated ray fan");
        Ok(RayFan {
            settings: settings.clone(),
            rays,
            skipped_angles,
        })
    }
}

/// Generate a fan with the default tracer.
pub fn generate_fan(
    profile: &SoundSpeedProfile,
    central_angle_deg: f64,
    ray_count: usize,
    angular_spacing_deg: f64,
    source_depth: Option<f64>,
    max_range: Option<f64>,
) -> Result<RayFan> {
    let settings = FanSettings {
        central_angle_deg,
        ray_count,
        angular_spacing_deg,
        source_depth,
        max_range,
    };
    FanGenerator::default().generate(profile, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bathyray_profile::build_profile;

    fn profile() -> SoundSpeedProfile {
        build_profile(
            &[0.0, 50.0, 100.0, 200.0, 400.0, 800.0],
            &[22.0, 21.5, 18.0, 12.0, 8.0, 5.0],
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_candidate_angles_odd() {
        let s = FanSettings {
            central_angle_deg: 0.0,
            ray_count: 5,
            angular_spacing_deg: 10.0,
            ..Default::default()
        };
        assert_eq!(s.candidate_angles(), vec![-20.0, -10.0, 0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_candidate_angles_even() {
        let s = FanSettings {
            central_angle_deg: 5.0,
            ray_count: 4,
            angular_spacing_deg: 2.0,
            ..Default::default()
        };
        assert_eq!(s.candidate_angles(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_fan_completeness() {
        let fan = generate_fan(&profile(), 0.0, 5, 10.0, None, Some(5000.0)).unwrap();
        assert_eq!(fan.len(), 5);
        assert!(fan.skipped_angles().is_empty());
        let launched: Vec<f64> = fan.rays().iter().map(|r| r.launch_angle_deg()).collect();
        // The horizontal ray is traced at the substitute angle.
        assert_eq!(launched, vec![-20.0, -10.0, 3.0, 10.0, 20.0]);
    }

    #[test]
    fn test_boundary_exclusion() {
        let fan = generate_fan(&profile(), 85.0, 3, 10.0, None, Some(2000.0)).unwrap();
        assert_eq!(fan.len(), 2);
        assert_eq!(fan.skipped_angles(), &[95.0]);
    }

    #[test]
    fn test_exactly_vertical_skipped() {
        let fan = generate_fan(&profile(), 80.0, 3, 10.0, None, Some(2000.0)).unwrap();
        assert_eq!(fan.len(), 2);
        assert_eq!(fan.skipped_angles(), &[90.0]);
    }

    #[test]
    fn test_all_ranges_monotonic() {
        let fan = generate_fan(&profile(), 0.0, 21, 1.5, Some(60.0), Some(10_000.0)).unwrap();
        for ray in fan.rays() {
            for w in ray.vertices().windows(2) {
                assert!(w[1].range >= w[0].range);
            }
            assert!(ray.final_range() >= 10_000.0);
        }
    }

    #[test]
    fn test_profile_reused() {
        let p = profile();
        let a = generate_fan(&p, 2.0, 3, 1.0, None, Some(3000.0)).unwrap();
        let b = generate_fan(&p, 2.0, 3, 1.0, None, Some(3000.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_fan() {
        let fan = generate_fan(&profile(), 0.0, 0, 1.0, None, None).unwrap();
        assert!(fan.is_empty());
    }

    #[test]
    fn test_trace_error_aborts_fan() {
        let err = generate_fan(&profile(), 0.0, 3, 1.0, Some(5000.0), None).unwrap_err();
        assert!(matches!(err, TraceError::InvalidSourceDepth { .. }));
    }

    #[test]
    fn test_invalid_spacing() {
        assert!(generate_fan(&profile(), 0.0, 3, 0.0, None, None).is_err());
    }
}
