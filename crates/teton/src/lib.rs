#![warn(missing_docs)]

//! Export of sliced layer geometry as a structured document.
//!
//! This crate takes the output of a slicer (meshes, layers, parts, and the
//! polygon groups computed for each part), labels every polygon ring with
//! its role, stamps scoped ids on every record, folds in per-mesh print
//! settings, and writes the resulting [`Document`] through a pluggable
//! [`Serializer`].
//!
//! # Example
//!
//! ```ignore
//! use teton::{export, Format, LogSink, ProcessEnvironment, SliceData};
//!
//! let data = SliceData::from_json(&std::fs::read_to_string("slices.json")?)?;
//! let path = export(&data, &Format::Json, &mut LogSink, &ProcessEnvironment)?;
//! println!("wrote {}", path.display());
//! ```

pub mod builder;
pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod output;
pub mod serialize;
pub mod settings;
pub mod snapshot;

pub use builder::{map_infill_pattern, mesh_role, skin_orientation, DocumentBuilder};
pub use classify::{classify_part, part_areas};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink};
pub use error::{ExportError, Result};
pub use ids::IdAllocator;
pub use output::{Environment, OutputNamer, ProcessEnvironment};
pub use serialize::{CompactSerializer, Format, JsonSerializer, Serializer};
pub use settings::{FromSetting, Settings, SettingsView};
pub use snapshot::{Point, Polygon, SkinPart, SliceData, SliceLayer, SliceLayerPart, SliceMesh};
pub use teton_ir::{
    AreaRecord, AreaType, Document, InfillPattern, LayerRecord, MeshRecord, MeshRole, PartRecord,
};

use std::path::{Path, PathBuf};

use log::info;

/// Build the document for `data`, reporting warnings to `sink`.
pub fn build_document(data: &SliceData, sink: &mut dyn DiagnosticSink) -> Result<Document> {
    DocumentBuilder::new(sink).build(data)
}

/// Export `data` to the location chosen by [`OutputNamer`].
///
/// Returns the path written. Nothing is written if building or rendering
/// fails.
pub fn export<S, E>(
    data: &SliceData,
    serializer: &S,
    sink: &mut dyn DiagnosticSink,
    env: &E,
) -> Result<PathBuf>
where
    S: Serializer + ?Sized,
    E: Environment,
{
    let doc = build_document(data, sink)?;
    let path = OutputNamer::new(env).resolve(&doc, serializer.extension());
    write_document(doc, serializer, &path)?;
    Ok(path)
}

/// Export `data` to an explicit path.
pub fn export_to<S>(
    data: &SliceData,
    serializer: &S,
    sink: &mut dyn DiagnosticSink,
    path: &Path,
) -> Result<()>
where
    S: Serializer + ?Sized,
{
    let doc = build_document(data, sink)?;
    write_document(doc, serializer, path)
}

/// Render a finished document and write it to `path`.
///
/// The document is consumed; it is fully rendered before the file is
/// created.
pub fn write_document<S>(doc: Document, serializer: &S, path: &Path) -> Result<()>
where
    S: Serializer + ?Sized,
{
    let bytes = serializer.render(&doc)?;

    std::fs::write(path, &bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
