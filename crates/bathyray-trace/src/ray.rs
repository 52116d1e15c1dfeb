//! Traced ray paths and their reflection events.

use serde::{Deserialize, Serialize};

/// A point on a ray path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayVertex {
    /// Horizontal range from the source (m).
    pub range: f64,
    /// Depth below the surface datum (m).
    pub depth: f64,
}

impl RayVertex {
    /// Create a new vertex.
    #[inline]
    pub fn new(range: f64, depth: f64) -> Self {
        Self { range, depth }
    }
}

/// How a ray was turned around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    /// Reflected at the face of the current slab: surface, ice, sea floor,
    /// or a slab too fast to enter at all.
    Immediate,
    /// Refracted into the next slab but turned at its far face, because the
    /// slab beyond it cannot be entered.
    Turning,
}

/// A reflection event along a ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// Kind of reflection.
    pub kind: ReflectionKind,
    /// Range at which the ray turned (m).
    pub range: f64,
    /// Depth at which the ray turned (m).
    pub depth: f64,
    /// Ray angle before reflection (rad); the outgoing angle is its negation.
    pub angle: f64,
}

/// Extents of a ray path, for choosing plot scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathBounds {
    /// Largest range reached (m).
    pub max_range: f64,
    /// Shallowest depth reached (m).
    pub min_depth: f64,
    /// Deepest depth reached (m).
    pub max_depth: f64,
}

/// The trajectory of one traced ray.
///
/// Vertices start at `(0, source_depth)` and have non-decreasing range.
/// A turning reflection contributes an extra apex vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RayPath {
    launch_angle_deg: f64,
    source_depth: f64,
    vertices: Vec<RayVertex>,
    reflections: Vec<Reflection>,
}

impl RayPath {
    pub(crate) fn new(launch_angle_deg: f64, source_depth: f64) -> Self {
        Self {
            launch_angle_deg,
            source_depth,
            vertices: vec![RayVertex::new(0.0, source_depth)],
            reflections: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, range: f64, depth: f64) {
        self.vertices.push(RayVertex::new(range, depth));
    }

    #[inline]
    pub(crate) fn reflect(&mut self, kind: ReflectionKind, range: f64, depth: f64, angle: f64) {
        self.reflections.push(Reflection {
            kind,
            range,
            depth,
            angle,
        });
    }

    /// Launch angle actually traced (degrees, positive downward).
    pub fn launch_angle_deg(&self) -> f64 {
        self.launch_angle_deg
    }

    /// Source depth (m).
    pub fn source_depth(&self) -> f64 {
        self.source_depth
    }

    /// Path vertices in order of increasing range.
    pub fn vertices(&self) -> &[RayVertex] {
        &self.vertices
    }

    /// Reflection events in order of increasing range.
    pub fn reflections(&self) -> &[Reflection] {
        &self.reflections
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the path has no vertices. Never the case for a traced ray.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Range of the final vertex (m).
    pub fn final_range(&self) -> f64 {
        self.vertices.last().map_or(0.0, |v| v.range)
    }

    /// Vertices as `(range, depth)` pairs.
    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        self.vertices.iter().map(|v| (v.range, v.depth)).collect()
    }

    /// Vertices flattened to `[r0, d0, r1, d1, ...]` for polyline drawing.
    pub fn to_flat(&self) -> Vec<f64> {
        self.vertices
            .iter()
            .flat_map(|v| [v.range, v.depth])
            .collect()
    }

    /// Range and depth extents.
    pub fn bounds(&self) -> PathBounds {
        let mut bounds = PathBounds {
            max_range: 0.0,
            min_depth: f64::INFINITY,
            max_depth: f64::NEG_INFINITY,
        };
        for v in &self.vertices {
            bounds.max_range = bounds.max_range.max(v.range);
            bounds.min_depth = bounds.min_depth.min(v.depth);
            bounds.max_depth = bounds.max_depth.max(v.depth);
        }
        bounds
    }
}
