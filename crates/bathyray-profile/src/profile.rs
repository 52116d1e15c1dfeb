//! Slab representation of a stratified water column.

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Numeric speed used for boundary slabs when a flat `f64` table is needed.
///
/// Large enough that any ray entering the slab satisfies the reflection test.
pub const REFLECTION_SENTINEL_SPEED: f64 = 1.0e7;

/// Empirical sound speed in seawater (m/s) from temperature (°C) and depth (m).
///
/// Salinity is implicitly fixed.
#[inline]
pub fn sound_speed(temperature: f64, depth: f64) -> f64 {
    1448.5 + 4.21 * temperature - 0.037 * temperature * temperature + 0.017 * depth
}

/// Sound speed assigned to a slab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "speed")]
pub enum SlabSpeed {
    /// Sound propagates through the slab at this speed (m/s).
    Propagating(f64),
    /// Reflecting boundary: the surface/ice slab or the sea floor.
    Boundary,
}

impl SlabSpeed {
    /// Propagation speed, or `None` for a boundary.
    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            SlabSpeed::Propagating(v) => Some(v),
            SlabSpeed::Boundary => None,
        }
    }

    /// Whether this slab always reflects.
    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, SlabSpeed::Boundary)
    }

    /// Speed with boundaries encoded as [`REFLECTION_SENTINEL_SPEED`].
    #[inline]
    pub fn as_sentinel_value(self) -> f64 {
        self.value().unwrap_or(REFLECTION_SENTINEL_SPEED)
    }
}

/// One horizontal layer of the water column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    /// Layer thickness (m), always positive.
    pub thickness: f64,
    /// Sound speed in the layer.
    pub speed: SlabSpeed,
}

impl Slab {
    /// Create a propagating slab.
    pub fn propagating(thickness: f64, speed: f64) -> Self {
        Self {
            thickness,
            speed: SlabSpeed::Propagating(speed),
        }
    }

    /// Create a reflecting boundary slab.
    pub fn boundary(thickness: f64) -> Self {
        Self {
            thickness,
            speed: SlabSpeed::Boundary,
        }
    }
}

/// Stratified sound-speed model of a water column.
///
/// Slab 0 is the surface (or ice underside) boundary slab. Slabs `1..n-1`
/// stack downward from `top_depth`, and the final slab is the sea-floor
/// boundary. The profile is immutable once built and can be shared across
/// any number of ray traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundSpeedProfile {
    top_depth: f64,
    bottom_depth: f64,
    slabs: Vec<Slab>,
}

impl SoundSpeedProfile {
    /// Assemble a profile from an explicit slab table.
    ///
    /// Requires at least one propagating slab between a leading and a trailing
    /// boundary, positive finite thicknesses, positive finite speeds, and
    /// `top_depth < bottom_depth`.
    pub fn from_slabs(top_depth: f64, bottom_depth: f64, slabs: Vec<Slab>) -> Result<Self> {
        if !(top_depth.is_finite() && bottom_depth.is_finite()) || top_depth >= bottom_depth {
            return Err(ProfileError::InvalidSlab {
                index: 0,
                reason: format!("top depth {top_depth} must lie above bottom depth {bottom_depth}"),
            });
        }
        if slabs.len() < 3 {
            return Err(ProfileError::InvalidSlab {
                index: slabs.len(),
                reason: "need a surface boundary, at least one water slab and a bottom boundary"
                    .into(),
            });
        }
        let last = slabs.len() - 1;
        for (index, slab) in slabs.iter().enumerate() {
            if !(slab.thickness.is_finite() && slab.thickness > 0.0) {
                return Err(ProfileError::InvalidSlab {
                    index,
                    reason: format!("thickness {} is not positive", slab.thickness),
                });
            }
            let edge = index == 0 || index == last;
            match slab.speed {
                SlabSpeed::Boundary if !edge => {
                    return Err(ProfileError::InvalidSlab {
                        index,
                        reason: "boundary slab inside the water column".into(),
                    });
                }
                SlabSpeed::Propagating(_) if edge => {
                    return Err(ProfileError::InvalidSlab {
                        index,
                        reason: "first and last slabs must be boundaries".into(),
                    });
                }
                SlabSpeed::Propagating(v) if !(v.is_finite() && v > 0.0) => {
                    return Err(ProfileError::NonPositiveSpeed { slab: index, speed: v });
                }
                _ => {}
            }
        }
        Ok(Self::from_parts(top_depth, bottom_depth, slabs))
    }

    /// Constant-speed water column sliced into equal slabs.
    pub fn uniform(top_depth: f64, bottom_depth: f64, speed: f64, thickness: f64) -> Result<Self> {
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(ProfileError::InvalidSlab {
                index: 1,
                reason: format!("thickness {thickness} is not positive"),
            });
        }
        let count = ((bottom_depth - top_depth) / thickness).ceil().max(1.0) as usize;
        let mut slabs = Vec::with_capacity(count + 2);
        slabs.push(Slab::boundary(1.0));
        slabs.extend((0..count).map(|_| Slab::propagating(thickness, speed)));
        slabs.push(Slab::boundary(thickness));
        Self::from_slabs(top_depth, bottom_depth, slabs)
    }

    /// Trusted constructor used by the builder.
    pub(crate) fn from_parts(top_depth: f64, bottom_depth: f64, slabs: Vec<Slab>) -> Self {
        Self {
            top_depth,
            bottom_depth,
            slabs,
        }
    }

    /// Depth of the top of the water column (m); non-zero under ice.
    #[inline]
    pub fn top_depth(&self) -> f64 {
        self.top_depth
    }

    /// Depth of the sea floor (m).
    #[inline]
    pub fn bottom_depth(&self) -> f64 {
        self.bottom_depth
    }

    /// All slabs, surface boundary first.
    #[inline]
    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    /// Number of slabs including both boundaries.
    #[inline]
    pub fn len(&self) -> usize {
        self.slabs.len()
    }

    /// Always false for a constructed profile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    /// Thickness of slab `index` (m).
    #[inline]
    pub fn thickness(&self, index: usize) -> Option<f64> {
        self.slabs.get(index).map(|s| s.thickness)
    }

    /// Speed of slab `index`. Indices outside the table are boundaries.
    #[inline]
    pub fn speed(&self, index: isize) -> SlabSpeed {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.slabs.get(i))
            .map_or(SlabSpeed::Boundary, |s| s.speed)
    }

    /// Slab thicknesses, index-aligned with [`Self::slab_speeds`].
    pub fn slab_thicknesses(&self) -> Vec<f64> {
        self.slabs.iter().map(|s| s.thickness).collect()
    }

    /// Slab speeds with boundaries encoded as [`REFLECTION_SENTINEL_SPEED`].
    pub fn slab_speeds(&self) -> Vec<f64> {
        self.slabs.iter().map(|s| s.speed.as_sentinel_value()).collect()
    }

    /// Depth of the upper face of each slab.
    ///
    /// The surface slab sits above `top_depth`; water slab 1 starts at `top_depth`.
    pub fn slab_top_depths(&self) -> Vec<f64> {
        let mut tops = Vec::with_capacity(self.slabs.len());
        let mut depth = self.top_depth;
        for (index, slab) in self.slabs.iter().enumerate() {
            if index == 0 {
                tops.push(self.top_depth - slab.thickness);
            } else {
                tops.push(depth);
                depth += slab.thickness;
            }
        }
        tops
    }

    /// Speed of the water slab containing `depth`, or `None` outside the water column.
    pub fn speed_at_depth(&self, depth: f64) -> Option<f64> {
        if depth < self.top_depth || depth > self.bottom_depth {
            return None;
        }
        let mut lower = self.top_depth;
        let mut last = None;
        for slab in self.slabs.iter().skip(1) {
            if let SlabSpeed::Propagating(v) = slab.speed {
                lower += slab.thickness;
                last = Some(v);
                if depth <= lower {
                    return last;
                }
            }
        }
        last
    }

    /// Minimum and maximum propagating speed.
    pub fn speed_range(&self) -> Option<(f64, f64)> {
        self.slabs
            .iter()
            .filter_map(|s| s.speed.value())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
