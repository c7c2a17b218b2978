//! Output artifact naming.
//!
//! The file name comes from the single regular mesh when there is exactly
//! one, otherwise from a fixed default. The directory comes from the
//! environment:
//!
//! 1. `CURA_POLY_DIR`
//! 2. the first set of `TMPDIR`, `TMP`, `TEMP`, `TEMPDIR`
//! 3. `/tmp`
//!
//! Variables set to an empty string count as unset.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use teton_ir::{Document, MeshRole};

/// Explicit output directory override.
pub const OUTPUT_DIR_VAR: &str = "CURA_POLY_DIR";

/// Temp-directory variables, in lookup order.
pub const TEMP_DIR_VARS: [&str; 4] = ["TMPDIR", "TMP", "TEMP", "TEMPDIR"];

/// Directory used when no variable is set.
pub const FALLBACK_DIR: &str = "/tmp";

/// Base name used when there is not exactly one regular mesh.
pub const DEFAULT_BASE_NAME: &str = "teton-mesh.stl";

/// Mesh file extensions replaced by the document extension.
pub const SOURCE_EXTENSIONS: [&str; 5] = ["stl", "obj", "3mf", "amf", "ply"];

/// Source of environment variables.
pub trait Environment {
    /// Value of `name`, `None` if unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolves where an export is written.
#[derive(Debug)]
pub struct OutputNamer<'a, E: Environment> {
    env: &'a E,
}

impl<'a, E: Environment> OutputNamer<'a, E> {
    /// Namer reading variables from `env`.
    pub fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Full output path for `doc` with the given extension (no dot).
    pub fn resolve(&self, doc: &Document, extension: &str) -> PathBuf {
        self.directory().join(file_name(doc, extension))
    }

    /// Output directory by variable precedence.
    pub fn directory(&self) -> PathBuf {
        std::iter::once(OUTPUT_DIR_VAR)
            .chain(TEMP_DIR_VARS)
            .find_map(|name| self.env.var(name).filter(|v| !v.is_empty()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
    }
}

/// Name of the single regular mesh, `None` if there are zero or several.
pub fn single_normal_mesh(doc: &Document) -> Option<&str> {
    let mut normal = doc.meshes.iter().filter(|m| m.role == MeshRole::Normal);
    match (normal.next(), normal.next()) {
        (Some(mesh), None) => Some(mesh.name.as_str()),
        _ => None,
    }
}

/// File name for `doc`: the base name with its mesh extension replaced by
/// `extension`.
///
/// Mesh names may be paths; only the final component is kept so the file
/// always lands in the output directory.
pub fn file_name(doc: &Document, extension: &str) -> String {
    let base = single_normal_mesh(doc)
        .and_then(|name| Path::new(name).file_name())
        .and_then(OsStr::to_str)
        .unwrap_or(DEFAULT_BASE_NAME);
    replace_extension(base, extension)
}

/// Replace a trailing mesh-file extension with `extension`, or append it.
pub fn replace_extension(name: &str, extension: &str) -> String {
    let stem = name
        .rsplit_once('.')
        .filter(|(_, ext)| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .map_or(name, |(stem, _)| stem);
    format!("{}.{}", stem, extension)
}
