//! Error types for the exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A required print setting is absent on a mesh.
    #[error("mesh '{mesh}': missing setting '{name}'")]
    MissingSetting {
        /// Name of the mesh being exported.
        mesh: String,
        /// Name of the missing setting.
        name: String,
    },

    /// A print setting is present but cannot be read as the expected type.
    #[error("mesh '{mesh}': setting '{name}' = '{value}' is not a valid {expected}")]
    InvalidSetting {
        /// Name of the mesh being exported.
        mesh: String,
        /// Name of the setting.
        name: String,
        /// Raw value found.
        value: String,
        /// Expected type description.
        expected: &'static str,
    },

    /// The document could not be rendered.
    #[error("failed to render document: {0}")]
    Serialize(String),

    /// A rendered document could not be parsed back.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// The output artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A slice snapshot could not be decoded.
    #[error("invalid slice snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl ExportError {
    /// Attach the mesh name to a setting error raised by a bare settings view.
    pub(crate) fn for_mesh(self, mesh_name: &str) -> Self {
        match self {
            Self::MissingSetting { name, .. } => Self::MissingSetting {
                mesh: mesh_name.to_string(),
                name,
            },
            Self::InvalidSetting {
                name,
                value,
                expected,
                ..
            } => Self::InvalidSetting {
                mesh: mesh_name.to_string(),
                name,
                value,
                expected,
            },
            other => other,
        }
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
