//! Document model for exported slice geometry.
//!
//! A [`Document`] is the hierarchical record of one export: meshes contain
//! layers, layers contain parts, parts contain classified polygon areas.
//! The tree is purely declarative. Building it from slicer output is the job
//! of the `teton` crate; this crate only defines the shape and its wire forms.
//!
//! Two wire forms are provided:
//! - pretty JSON via [`Document::to_json`] / [`Document::from_json`]
//! - a line-oriented text form in [`compact`]
//!
//! Both always carry every field, so consumers can rely on fixed field
//! presence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod compact;

/// Identifier stamped on every record. Dense and 1-based within its scope.
pub type RecordId = u64;

/// Integer length in the slicer's fixed-point unit.
pub type Coord = i64;

/// Current document format version.
pub const DOCUMENT_VERSION: &str = "1";

/// Semantic role of a polygon ring within a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    /// Outer boundary of the part.
    Exterior,
    /// Hole in the part outline.
    Hole,
    /// Perimeter ring at some inset depth.
    Wall,
    /// Top/bottom solid fill boundary or skin hole.
    Skin,
    /// Sparse interior fill region.
    Infill,
    /// Residual region too thin for walls.
    Gap,
}

/// Role of a mesh in the print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeshRole {
    /// Regular printed object.
    #[default]
    Normal,
    /// Modifier mesh that overrides infill of other meshes.
    Infill,
    /// Mesh cutting other meshes.
    Cutting,
    /// Support or anti-overhang mesh.
    Unknown,
}

/// Infill pattern of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InfillPattern {
    /// Rectilinear grid.
    Grid,
    /// Triangular grid.
    Triangle,
    /// Cubic subdivision.
    Cubic,
    /// Any pattern without a mapping.
    #[default]
    Unknown,
}

/// Error returned when parsing one of the closed enums from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

macro_rules! named_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// All variants in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Wire name of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

named_enum!(AreaType, "area type", [Exterior, Hole, Wall, Skin, Infill, Gap]);
named_enum!(MeshRole, "mesh role", [Normal, Infill, Cutting, Unknown]);
named_enum!(InfillPattern, "infill pattern", [Grid, Triangle, Cubic, Unknown]);

/// One classified polygon ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    /// Id within the part, shared across all area types.
    pub id: RecordId,
    /// Semantic role of the ring.
    #[serde(rename = "type")]
    pub area_type: AreaType,
    /// Id of the enclosing area, 0 when none. Never resolved, always 0.
    pub inside: RecordId,
    /// Interleaved coordinates `x0, y0, x1, y1, ...`.
    pub points: Vec<Coord>,
}

impl AreaRecord {
    /// Number of points in the ring.
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }
}

/// One contiguous printable region of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Id within the layer.
    pub id: RecordId,
    /// Areas in classification order; the exterior comes first.
    pub areas: Vec<AreaRecord>,
}

/// One horizontal slice of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Id within the mesh.
    pub id: RecordId,
    /// Print Z of the layer.
    pub height: f64,
    /// Layer thickness.
    pub line_thickness: f64,
    /// Uniform extrusion width used for the whole layer.
    pub line_width: Coord,
    /// Skin direction for this layer, degrees.
    pub skin_orientation: f64,
    /// Parts in slicer order.
    pub parts: Vec<PartRecord>,
}

/// One sliced mesh with its print settings folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Id within the document.
    pub id: RecordId,
    /// Mesh name as reported by the slicer (usually the source file name).
    pub name: String,
    /// Role of the mesh.
    pub role: MeshRole,
    /// Distance between infill lines.
    pub infill_line_spacing: Coord,
    /// Infill pattern.
    pub infill_pattern: InfillPattern,
    /// Infill angles in degrees, in configured order.
    pub infill_angles: Vec<f64>,
    /// Emitted layers, bottom to top.
    pub layers: Vec<LayerRecord>,
}

impl MeshRecord {
    /// Total number of parts across all layers.
    pub fn part_count(&self) -> usize {
        self.layers.iter().map(|l| l.parts.len()).sum()
    }

    /// Total number of areas across all layers and parts.
    pub fn area_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|l| &l.parts)
            .map(|p| p.areas.len())
            .sum()
    }
}

/// A complete export: the root of the record tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// Meshes in processing order.
    pub meshes: Vec<MeshRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            meshes: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
