//! Slicer output consumed by the exporter.
//!
//! These types mirror what the slicer produces: meshes, their layers, and
//! the parts of each layer with their polygon groups already computed. The
//! exporter never modifies them. They are serde-enabled so a snapshot can be
//! stored as JSON and replayed through the exporter.

use serde::{Deserialize, Serialize};
use teton_ir::Coord;

use crate::error::Result;
use crate::settings::Settings;

/// A 2D point in fixed-point slicer units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: Coord,
    /// Y coordinate.
    pub y: Coord,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

/// A closed polygon ring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices in ring order.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create a polygon from `(x, y)` pairs.
    pub fn from_coords(coords: &[(Coord, Coord)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Axis-aligned rectangle, counter-clockwise from `(x0, y0)`.
    pub fn rect(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> Self {
        Self::from_coords(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interleaved coordinates `x0, y0, x1, y1, ...` in ring order.
    pub fn flat_coords(&self) -> Vec<Coord> {
        let mut coords = Vec::with_capacity(self.points.len() * 2);
        for p in &self.points {
            coords.push(p.x);
            coords.push(p.y);
        }
        coords
    }
}

/// A skin (solid top/bottom) island. The first ring is its outer boundary,
/// the rest are holes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinPart {
    /// Rings of the island.
    pub outline: Vec<Polygon>,
}

/// One contiguous region of a layer with its computed polygon groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceLayerPart {
    /// Part outline. The first ring is the outer boundary, the rest are holes.
    pub outline: Vec<Polygon>,
    /// Wall rings grouped by inset depth, outermost first.
    #[serde(default)]
    pub insets: Vec<Vec<Polygon>>,
    /// Skin islands.
    #[serde(default)]
    pub skin_parts: Vec<SkinPart>,
    /// Infill region rings owned by this part.
    #[serde(default)]
    pub infill_area: Vec<Polygon>,
    /// Gaps between the outline and the outer wall.
    #[serde(default)]
    pub outline_gaps: Vec<Polygon>,
    /// Gaps between walls.
    #[serde(default)]
    pub perimeter_gaps: Vec<Polygon>,
}

/// One layer of a sliced mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceLayer {
    /// Z of the top of the layer.
    pub print_z: Coord,
    /// Layer thickness.
    pub thickness: Coord,
    /// Parts in slicer order.
    #[serde(default)]
    pub parts: Vec<SliceLayerPart>,
}

/// A sliced mesh with its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMesh {
    /// Mesh name, usually the source file name.
    pub name: String,
    /// Print settings of the mesh.
    pub settings: Settings,
    /// Configured infill angles, degrees.
    #[serde(default)]
    pub infill_angles: Vec<f64>,
    /// Skin angles cycled per layer, degrees.
    #[serde(default)]
    pub skin_angles: Vec<f64>,
    /// Index of the highest layer holding geometry, -1 when none does.
    pub layer_nr_max_filled_layer: i64,
    /// Layers bottom to top.
    #[serde(default)]
    pub layers: Vec<SliceLayer>,
}

impl SliceMesh {
    /// Create a mesh without layers.
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            name: name.into(),
            settings,
            infill_angles: Vec::new(),
            skin_angles: Vec::new(),
            layer_nr_max_filled_layer: -1,
            layers: Vec::new(),
        }
    }

    /// Append a layer and mark it filled.
    pub fn push_layer(&mut self, layer: SliceLayer) {
        self.layers.push(layer);
        self.layer_nr_max_filled_layer = self.layers.len() as i64 - 1;
    }
}

/// Output of one slicing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceData {
    /// Meshes in slicing order.
    pub meshes: Vec<SliceMesh>,
}

impl SliceData {
    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
