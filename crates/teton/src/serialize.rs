//! Rendering of finished documents.
//!
//! A [`Serializer`] turns a [`Document`] into the bytes of the output
//! artifact. Rendering is pure; writing the bytes is the caller's job.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use teton_ir::{compact, Document};

use crate::error::{ExportError, Result};

/// Renders a document to bytes.
pub trait Serializer {
    /// Render `doc`. Every field of every record is emitted.
    fn render(&self, doc: &Document) -> Result<Vec<u8>>;

    /// File extension of the rendered artifact, without the dot.
    fn extension(&self) -> &'static str;
}

/// Structured JSON form.
#[derive(Debug, Clone, Copy)]
pub struct JsonSerializer {
    /// Indent nested records.
    pub pretty: bool,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        bytes.map_err(|e| ExportError::Serialize(e.to_string()))
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Compact line-oriented debug form.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSerializer;

impl Serializer for CompactSerializer {
    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        Ok(compact::to_compact(doc).into_bytes())
    }

    fn extension(&self) -> &'static str {
        "teton"
    }
}

/// Runtime choice of output form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty JSON.
    #[default]
    Json,
    /// Compact text.
    Compact,
}

impl Format {
    /// Form implied by a file extension, `None` if unrecognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "teton" | "txt" => Some(Format::Compact),
            _ => None,
        }
    }

    /// Parse a document previously rendered in this form.
    pub fn parse(&self, text: &str) -> Result<Document> {
        match self {
            Format::Json => {
                Document::from_json(text).map_err(|e| ExportError::Parse(e.to_string()))
            }
            Format::Compact => {
                compact::from_compact(text).map_err(|e| ExportError::Parse(e.to_string()))
            }
        }
    }
}

impl Serializer for Format {
    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        match self {
            Format::Json => JsonSerializer::default().render(doc),
            Format::Compact => CompactSerializer.render(doc),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Format::Json => JsonSerializer::default().extension(),
            Format::Compact => CompactSerializer.extension(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "json",
            Format::Compact => "compact",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "compact" | "teton" => Ok(Format::Compact),
            other => Err(format!("unknown format: {other} (expected json or compact)")),
        }
    }
}
