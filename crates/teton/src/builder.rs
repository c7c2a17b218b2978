//! Assembly of the export document from slicer output.

use log::{debug, Level};
use teton_ir::{
    Coord, Document, InfillPattern, LayerRecord, MeshRecord, MeshRole, PartRecord, RecordId,
};

use crate::classify::part_areas;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::ids::IdAllocator;
use crate::settings::SettingsView;
use crate::snapshot::{SliceData, SliceLayer, SliceMesh};

/// Setting names read by the builder.
pub mod keys {
    /// Outer wall line width; the width emitted for every layer.
    pub const WALL_LINE_WIDTH_0: &str = "wall_line_width_0";
    /// Inner wall line width.
    pub const WALL_LINE_WIDTH_X: &str = "wall_line_width_x";
    /// Skin line width.
    pub const SKIN_LINE_WIDTH: &str = "skin_line_width";
    /// Infill line width.
    pub const INFILL_LINE_WIDTH: &str = "infill_line_width";
    /// First layer width multiplier, percent.
    pub const INITIAL_LAYER_LINE_WIDTH_FACTOR: &str = "initial_layer_line_width_factor";
    /// Distance between infill lines.
    pub const INFILL_LINE_DISTANCE: &str = "infill_line_distance";
    /// Infill pattern name.
    pub const INFILL_PATTERN: &str = "infill_pattern";
    /// Mesh is an infill modifier.
    pub const INFILL_MESH: &str = "infill_mesh";
    /// Mesh cuts other meshes.
    pub const CUTTING_MESH: &str = "cutting_mesh";
    /// Mesh blocks support.
    pub const ANTI_OVERHANG_MESH: &str = "anti_overhang_mesh";
    /// Mesh is printed as support.
    pub const SUPPORT_MESH: &str = "support_mesh";
}

/// Role of a mesh from its flags. The first set flag in the order
/// infill, cutting, anti-overhang/support wins.
pub fn mesh_role<S: SettingsView>(settings: &S) -> Result<MeshRole> {
    if settings.get::<bool>(keys::INFILL_MESH)? {
        return Ok(MeshRole::Infill);
    }
    if settings.get::<bool>(keys::CUTTING_MESH)? {
        return Ok(MeshRole::Cutting);
    }
    if settings.get::<bool>(keys::ANTI_OVERHANG_MESH)?
        || settings.get::<bool>(keys::SUPPORT_MESH)?
    {
        return Ok(MeshRole::Unknown);
    }
    Ok(MeshRole::Normal)
}

/// Map a slicer infill pattern name. Unmapped names become
/// [`InfillPattern::Unknown`].
pub fn map_infill_pattern(name: &str) -> InfillPattern {
    match name.trim().to_ascii_lowercase().as_str() {
        "grid" => InfillPattern::Grid,
        "triangles" => InfillPattern::Triangle,
        "cubic" => InfillPattern::Cubic,
        _ => InfillPattern::Unknown,
    }
}

/// Skin direction for a layer, cycling through `angles`. 0 when empty.
pub fn skin_orientation(angles: &[f64], layer_nr: usize) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    angles[layer_nr % angles.len()]
}

/// Builds a [`Document`] from slicer output.
///
/// Non-fatal findings (inconsistent widths, ignored first-layer factor,
/// missing skin angles, unmapped infill pattern) go to the injected sink.
pub struct DocumentBuilder<'a> {
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder reporting to `sink`.
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    /// Build the document for every mesh, in input order.
    pub fn build(&mut self, data: &SliceData) -> Result<Document> {
        let mut ids = IdAllocator::new();
        let mut doc = Document::new();

        for mesh in &data.meshes {
            let record = self.build_mesh(ids.allocate(), mesh)?;
            doc.meshes.push(record);
        }

        debug!("built document with {} meshes", doc.meshes.len());
        Ok(doc)
    }

    /// Build the record of a single mesh.
    pub fn build_mesh(&mut self, id: RecordId, mesh: &SliceMesh) -> Result<MeshRecord> {
        let settings = &mesh.settings;
        let read_err = |e: crate::ExportError| e.for_mesh(&mesh.name);

        let line_width = self.uniform_line_width(mesh).map_err(read_err)?;
        let role = mesh_role(settings).map_err(read_err)?;

        let pattern_name: String = settings.get(keys::INFILL_PATTERN).map_err(read_err)?;
        let infill_pattern = map_infill_pattern(&pattern_name);
        if infill_pattern == InfillPattern::Unknown {
            self.warn(format!(
                "mesh '{}': infill pattern '{}' has no mapping, exported as Unknown",
                mesh.name, pattern_name
            ));
        }

        let infill_line_spacing: Coord = settings
            .get(keys::INFILL_LINE_DISTANCE)
            .map_err(read_err)?;

        let mut layer_ids = IdAllocator::new();
        let mut layers = Vec::new();
        for (layer_nr, layer) in mesh.layers.iter().enumerate() {
            if layer_nr as i64 > mesh.layer_nr_max_filled_layer {
                break;
            }
            let skin = skin_orientation(&mesh.skin_angles, layer_nr);
            layers.push(build_layer(layer_ids.allocate(), layer, line_width, skin));
        }

        if mesh.skin_angles.is_empty() && !layers.is_empty() {
            self.warn(format!(
                "mesh '{}': no skin angles configured, using 0 for every layer",
                mesh.name
            ));
        }

        let record = MeshRecord {
            id,
            name: mesh.name.clone(),
            role,
            infill_line_spacing,
            infill_pattern,
            infill_angles: mesh.infill_angles.clone(),
            layers,
        };

        debug!(
            "mesh {} '{}': {} layers, {} parts, {} areas",
            record.id,
            record.name,
            record.layers.len(),
            record.part_count(),
            record.area_count()
        );

        Ok(record)
    }

    /// The single line width emitted for every layer of `mesh`.
    ///
    /// Per-feature widths are not carried in the document; any that differ
    /// from the outer wall width only produce a warning.
    fn uniform_line_width(&mut self, mesh: &SliceMesh) -> Result<Coord> {
        let settings = &mesh.settings;
        let line_width: Coord = settings.get(keys::WALL_LINE_WIDTH_0)?;

        for key in [
            keys::WALL_LINE_WIDTH_X,
            keys::SKIN_LINE_WIDTH,
            keys::INFILL_LINE_WIDTH,
        ] {
            let width: Coord = settings.get(key)?;
            if width != line_width {
                self.warn(format!(
                    "mesh '{}': {} of {} differs from {} of {}; exporting {} for all lines",
                    mesh.name,
                    key,
                    width,
                    keys::WALL_LINE_WIDTH_0,
                    line_width,
                    line_width
                ));
            }
        }

        let factor: f64 = settings.get(keys::INITIAL_LAYER_LINE_WIDTH_FACTOR)?;
        if factor != 100.0 {
            self.warn(format!(
                "mesh '{}': initial layer line width factor of {}% will be ignored",
                mesh.name, factor
            ));
        }

        Ok(line_width)
    }

    fn warn(&mut self, message: String) {
        self.sink.emit(Level::Warn, &message);
    }
}

fn build_layer(id: RecordId, layer: &SliceLayer, line_width: Coord, skin: f64) -> LayerRecord {
    let mut part_ids = IdAllocator::new();
    let parts = layer
        .parts
        .iter()
        .map(|part| PartRecord {
            id: part_ids.allocate(),
            areas: part_areas(part),
        })
        .collect();

    LayerRecord {
        id,
        height: layer.print_z as f64,
        line_thickness: layer.thickness as f64,
        line_width,
        skin_orientation: skin,
        parts,
    }
}
