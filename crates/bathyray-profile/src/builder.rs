//! Adaptive slab construction from raw bathythermograph samples.
//!
//! Consecutive valid samples are joined by a linear sound-speed gradient.
//! Each interval is cut into slabs thin enough that speed changes by about
//! [`ProfileSettings::speed_resolution`] per slab, but never thicker than the
//! depth band's ceiling. Gentle gradients at depth get coarser slabs.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ProfileError, Result};
use crate::profile::{sound_speed, Slab, SlabSpeed, SoundSpeedProfile};
use crate::units::{DepthUnit, TemperatureUnit};

/// Maximum slab thickness above a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    /// Band applies while the running depth is shallower than this (m).
    pub above: f64,
    /// Slab thickness ceiling inside the band (m).
    pub max_thickness: f64,
}

/// Profile construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Thickness of the surface (or ice) boundary slab (m).
    pub surface_slab_thickness: f64,
    /// Target sound-speed change per slab (m/s).
    pub speed_resolution: f64,
    /// Thickness ceilings ordered by increasing depth.
    pub depth_bands: Vec<DepthBand>,
    /// Ceiling below the deepest band (m).
    pub deep_max_thickness: f64,
    /// Upper bound on the number of slabs in one profile.
    pub max_slabs: usize,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            surface_slab_thickness: 1.0,
            speed_resolution: 0.5,
            depth_bands: vec![
                DepthBand { above: 100.0, max_thickness: 1.0 },
                DepthBand { above: 500.0, max_thickness: 5.0 },
                DepthBand { above: 2000.0, max_thickness: 10.0 },
            ],
            deep_max_thickness: 20.0,
            max_slabs: 1_000_000,
        }
    }
}

impl ProfileSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.surface_slab_thickness > 0.0) {
            return Err(ProfileError::InvalidSettings(
                "surface_slab_thickness must be positive".into(),
            ));
        }
        if !(self.speed_resolution > 0.0) {
            return Err(ProfileError::InvalidSettings(
                "speed_resolution must be positive".into(),
            ));
        }
        if !(self.deep_max_thickness > 0.0) {
            return Err(ProfileError::InvalidSettings(
                "deep_max_thickness must be positive".into(),
            ));
        }
        if self.depth_bands.iter().any(|b| !(b.max_thickness > 0.0)) {
            return Err(ProfileError::InvalidSettings(
                "depth band thickness must be positive".into(),
            ));
        }
        if self.depth_bands.windows(2).any(|w| w[0].above >= w[1].above) {
            return Err(ProfileError::InvalidSettings(
                "depth bands must be ordered by increasing depth".into(),
            ));
        }
        if self.max_slabs < 3 {
            return Err(ProfileError::InvalidSettings(
                "max_slabs must allow at least 3 slabs".into(),
            ));
        }
        Ok(())
    }

    /// Slab thickness ceiling at `depth`.
    pub fn step_limit(&self, depth: f64) -> f64 {
        self.depth_bands
            .iter()
            .find(|band| depth < band.above)
            .map_or(self.deep_max_thickness, |band| band.max_thickness)
    }
}

/// Raw bathythermograph record as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bathythermograph {
    /// Sample depths, shallowest first.
    pub depths: Vec<f64>,
    /// Sample temperatures; values `>= 1000` mark missing readings.
    pub temperatures: Vec<f64>,
    /// Depth unit tag (`"m"`, `"ft"`, `"fm"`), metres when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_unit: Option<String>,
    /// Temperature unit tag, Celsius unless it starts with `f`/`F`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<String>,
}

/// Builds [`SoundSpeedProfile`]s. Holds only settings; no state is shared
/// between builds.
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    settings: ProfileSettings,
}

impl ProfileBuilder {
    /// Create a builder with validated settings.
    pub fn new(settings: ProfileSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Builder settings.
    pub fn settings(&self) -> &ProfileSettings {
        &self.settings
    }

    /// Build a profile from a bathythermograph record, parsing its unit tags.
    pub fn build_record(&self, record: &Bathythermograph) -> Result<SoundSpeedProfile> {
        let depth_unit = record
            .depth_unit
            .as_deref()
            .map_or(DepthUnit::Meters, DepthUnit::from_tag);
        let temperature_unit = record
            .temperature_unit
            .as_deref()
            .map_or(TemperatureUnit::Celsius, TemperatureUnit::from_tag);
        self.build(&record.depths, &record.temperatures, depth_unit, temperature_unit)
    }

    /// Build a profile from parallel depth and temperature samples.
    ///
    /// Depths must descend between valid samples. Missing temperatures are
    /// skipped and the gradient spans from the last valid sample.
    pub fn build(
        &self,
        depths: &[f64],
        temperatures: &[f64],
        depth_unit: DepthUnit,
        temperature_unit: TemperatureUnit,
    ) -> Result<SoundSpeedProfile> {
        if depths.is_empty() {
            return Err(ProfileError::EmptyProfile);
        }
        if depths.len() != temperatures.len() {
            return Err(ProfileError::LengthMismatch {
                depths: depths.len(),
                temperatures: temperatures.len(),
            });
        }

        let depths: Vec<f64> = depths.iter().map(|&d| depth_unit.to_meters(d)).collect();
        let speeds: Vec<Option<f64>> = temperatures
            .iter()
            .zip(&depths)
            .map(|(&t, &d)| temperature_unit.normalize(t).map(|t| sound_speed(t, d)))
            .collect();

        let top_depth = depths[0];
        let bottom_depth = depths[depths.len() - 1];

        let first = speeds
            .iter()
            .position(Option::is_some)
            .ok_or(ProfileError::NoValidSamples)?;
        let mut speed = speeds[first].ok_or(ProfileError::NoValidSamples)?;
        let mut anchor = depths[first];
        let mut depth = top_depth;

        let mut slabs = vec![Slab::propagating(self.settings.surface_slab_thickness, speed)];
        let mut reached_bottom = false;

        for (index, next) in speeds.iter().enumerate().skip(first + 1) {
            let Some(next) = *next else {
                trace!(index, "skipping sample with missing temperature");
                continue;
            };
            let sample_depth = depths[index];
            let span = sample_depth - anchor;
            if !(span > 0.0) {
                return Err(ProfileError::NonIncreasingDepth {
                    index,
                    depth: sample_depth,
                    previous: anchor,
                });
            }

            let gradient = (next - speed) / span;
            let limit = self.settings.step_limit(depth);
            let dz = if gradient == 0.0 {
                limit
            } else {
                (self.settings.speed_resolution / gradient).abs().min(limit)
            };
            let dv = dz * gradient;

            while depth <= sample_depth && depth < bottom_depth {
                depth += dz;
                speed += dv;
                if !(speed > 0.0) {
                    return Err(ProfileError::NonPositiveSpeed {
                        slab: slabs.len(),
                        speed,
                    });
                }
                slabs.push(Slab::propagating(dz, speed));
                if slabs.len() >= self.settings.max_slabs {
                    return Err(ProfileError::SlabLimit {
                        limit: self.settings.max_slabs,
                    });
                }
            }
            anchor = sample_depth;

            if depth >= bottom_depth {
                reached_bottom = true;
                break;
            }
        }

        if !reached_bottom {
            warn!(
                depth,
                bottom_depth, "profile ends above its bottom depth; closing with a boundary slab"
            );
        }
        let floor_thickness = slabs
            .last()
            .map_or(self.settings.surface_slab_thickness, |s| s.thickness);
        slabs.push(Slab::boundary(floor_thickness));
        slabs[0].speed = SlabSpeed::Boundary;

        debug!(
            slabs = slabs.len(),
            top_depth, bottom_depth, "built sound-speed profile"
        );
        Ok(SoundSpeedProfile::from_parts(top_depth, bottom_depth, slabs))
    }
}

/// Build a profile with default settings from optional unit tags.
pub fn build_profile(
    depths: &[f64],
    temperatures: &[f64],
    depth_unit: Option<&str>,
    temperature_unit: Option<&str>,
) -> Result<SoundSpeedProfile> {
    ProfileBuilder::default().build(
        depths,
        temperatures,
        depth_unit.map_or(DepthUnit::Meters, DepthUnit::from_tag),
        temperature_unit.map_or(TemperatureUnit::Celsius, TemperatureUnit::from_tag),
    )
}
