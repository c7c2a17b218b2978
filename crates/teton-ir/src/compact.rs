//! Compact line-oriented text form of a [`Document`].
//!
//! Meant for eyeballing and diffing exports. One record per line; nesting is
//! implied by record order, each record belongs to the closest preceding
//! record of the enclosing kind.
//!
//! # Format
//!
//! ```text
//! # teton 1
//! MESH id "name" role infill_line_spacing infill_pattern [a0,a1,...]
//! LAYER id height line_thickness line_width skin_orientation
//! PART id
//! AREA id type inside x0 y0 x1 y1 ...
//! ```
//!
//! Every field is always written. Angle lists are a single bracketed token,
//! `[]` when empty. Names escape `"`, `\`, line feeds and carriage returns
//! with a backslash. Blank lines and `#` comments are skipped by the parser,
//! except the `# teton <version>` header.
//!
//! # Example
//!
//! A single square part with one wall:
//!
//! ```text
//! # teton 1
//! MESH 1 "cube.stl" Normal 6000 Grid [45,135]
//! LAYER 1 300 300 400 45
//! PART 1
//! AREA 1 Exterior 0 0 0 10000 0 10000 10000 0 10000
//! AREA 2 Wall 0 200 200 9800 200 9800 9800 200 9800
//! ```

use crate::{AreaRecord, Document, LayerRecord, MeshRecord, PartRecord};
use std::fmt::{self, Write as FmtWrite};
use std::str::FromStr;

/// Header prefix carrying the format version.
const HEADER_PREFIX: &str = "# teton ";

/// Error type for compact text parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactParseError {
    /// Line number where the error occurred (1-indexed).
    pub line: usize,
    /// Description of the error.
    pub message: String,
}

impl CompactParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompactParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CompactParseError {}

/// Convert a Document to compact text.
pub fn to_compact(doc: &Document) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_compact(&mut output, doc);
    output
}

/// Write a Document in compact form to any formatter sink.
pub fn write_compact<W: FmtWrite>(out: &mut W, doc: &Document) -> fmt::Result {
    writeln!(out, "{}{}", HEADER_PREFIX, doc.version)?;

    for mesh in &doc.meshes {
        writeln!(
            out,
            "MESH {} {} {} {} {} {}",
            mesh.id,
            format_quoted_string(&mesh.name),
            mesh.role,
            mesh.infill_line_spacing,
            mesh.infill_pattern,
            format_angles(&mesh.infill_angles)
        )?;

        for layer in &mesh.layers {
            writeln!(
                out,
                "LAYER {} {} {} {} {}",
                layer.id,
                layer.height,
                layer.line_thickness,
                layer.line_width,
                layer.skin_orientation
            )?;

            for part in &layer.parts {
                writeln!(out, "PART {}", part.id)?;

                for area in &part.areas {
                    write!(out, "AREA {} {} {}", area.id, area.area_type, area.inside)?;
                    for coord in &area.points {
                        write!(out, " {}", coord)?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }

    Ok(())
}

fn format_angles(angles: &[f64]) -> String {
    let joined: Vec<String> = angles.iter().map(|a| a.to_string()).collect();
    format!("[{}]", joined.join(","))
}

fn format_quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Parse compact text into a Document.
pub fn from_compact(s: &str) -> Result<Document, CompactParseError> {
    let mut doc = Document::new();

    for (idx, raw) in s.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();

        if let Some(version) = trimmed.strip_prefix(HEADER_PREFIX) {
            doc.version = version.trim().to_string();
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts = split_line_respecting_quotes(trimmed, line)?;
        match parts[0] {
            "MESH" => {
                let mesh = parse_mesh(&parts, line)?;
                doc.meshes.push(mesh);
            }
            "LAYER" => {
                let layer = parse_layer(&parts, line)?;
                doc.meshes
                    .last_mut()
                    .ok_or_else(|| CompactParseError::new(line, "LAYER before any MESH"))?
                    .layers
                    .push(layer);
            }
            "PART" => {
                let part = parse_part(&parts, line)?;
                doc.meshes
                    .last_mut()
                    .and_then(|m| m.layers.last_mut())
                    .ok_or_else(|| CompactParseError::new(line, "PART before any LAYER"))?
                    .parts
                    .push(part);
            }
            "AREA" => {
                let area = parse_area(&parts, line)?;
                doc.meshes
                    .last_mut()
                    .and_then(|m| m.layers.last_mut())
                    .and_then(|l| l.parts.last_mut())
                    .ok_or_else(|| CompactParseError::new(line, "AREA before any PART"))?
                    .areas
                    .push(area);
            }
            other => {
                return Err(CompactParseError::new(
                    line,
                    format!("unknown record: {}", other),
                ));
            }
        }
    }

    Ok(doc)
}

fn expect_fields(parts: &[&str], count: usize, line: usize) -> Result<(), CompactParseError> {
    if parts.len() != count {
        return Err(CompactParseError::new(
            line,
            format!(
                "{} requires {} fields, got {}",
                parts[0],
                count - 1,
                parts.len() - 1
            ),
        ));
    }
    Ok(())
}

fn parse_mesh(parts: &[&str], line: usize) -> Result<MeshRecord, CompactParseError> {
    expect_fields(parts, 7, line)?;
    Ok(MeshRecord {
        id: parse_num(parts[1], line)?,
        name: parse_quoted(parts[2], line)?,
        role: parse_enum(parts[3], line)?,
        infill_line_spacing: parse_num(parts[4], line)?,
        infill_pattern: parse_enum(parts[5], line)?,
        infill_angles: parse_angles(parts[6], line)?,
        layers: Vec::new(),
    })
}

fn parse_layer(parts: &[&str], line: usize) -> Result<LayerRecord, CompactParseError> {
    expect_fields(parts, 6, line)?;
    Ok(LayerRecord {
        id: parse_num(parts[1], line)?,
        height: parse_num(parts[2], line)?,
        line_thickness: parse_num(parts[3], line)?,
        line_width: parse_num(parts[4], line)?,
        skin_orientation: parse_num(parts[5], line)?,
        parts: Vec::new(),
    })
}

fn parse_part(parts: &[&str], line: usize) -> Result<PartRecord, CompactParseError> {
    expect_fields(parts, 2, line)?;
    Ok(PartRecord {
        id: parse_num(parts[1], line)?,
        areas: Vec::new(),
    })
}

fn parse_area(parts: &[&str], line: usize) -> Result<AreaRecord, CompactParseError> {
    if parts.len() < 4 {
        return Err(CompactParseError::new(
            line,
            format!("AREA requires at least 3 fields, got {}", parts.len() - 1),
        ));
    }

    let coords = &parts[4..];
    if coords.len() % 2 != 0 {
        return Err(CompactParseError::new(
            line,
            format!("odd coordinate count: {}", coords.len()),
        ));
    }

    Ok(AreaRecord {
        id: parse_num(parts[1], line)?,
        area_type: parse_enum(parts[2], line)?,
        inside: parse_num(parts[3], line)?,
        points: coords
            .iter()
            .map(|c| parse_num(c, line))
            .collect::<Result<_, _>>()?,
    })
}

fn parse_angles(s: &str, line: usize) -> Result<Vec<f64>, CompactParseError> {
    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| CompactParseError::new(line, format!("invalid angle list: {}", s)))?;

    inner
        .split(',')
        .filter(|a| !a.is_empty())
        .map(|a| parse_num(a, line))
        .collect()
}

fn parse_num<T: FromStr>(s: &str, line: usize) -> Result<T, CompactParseError> {
    s.parse()
        .map_err(|_| CompactParseError::new(line, format!("invalid number: {}", s)))
}

fn parse_enum<T>(s: &str, line: usize) -> Result<T, CompactParseError>
where
    T: FromStr<Err = crate::ParseEnumError>,
{
    s.parse()
        .map_err(|e: crate::ParseEnumError| CompactParseError::new(line, e.to_string()))
}

/// Unquote a string argument, resolving `\"`, `\\`, `\n` and `\r` escapes.
fn parse_quoted(s: &str, line: usize) -> Result<String, CompactParseError> {
    let inner = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| {
            CompactParseError::new(line, format!("expected quoted string: {}", s))
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(escaped) => out.push(escaped),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Split a line by whitespace, keeping quoted strings (with their quotes)
/// together.
fn split_line_respecting_quotes(
    line: &str,
    line_no: usize,
) -> Result<Vec<&str>, CompactParseError> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }

        if c.is_whitespace() {
            if let Some(s) = start.take() {
                parts.push(&line[s..i]);
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            if c == '"' {
                in_quotes = true;
            }
        }
    }

    if in_quotes {
        return Err(CompactParseError::new(line_no, "unterminated quoted string"));
    }
    if let Some(s) = start {
        parts.push(&line[s..]);
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaType, InfillPattern, MeshRole};

    const PLATE: &str = r#"# teton 1
MESH 1 "plate.stl" Normal 6000 Triangle [45,135]
LAYER 1 270 270 400 45
PART 1
AREA 1 Exterior 0 0 0 10000 0 10000 10000 0 10000
AREA 2 Hole 0 4000 4000 6000 4000 6000 6000
AREA 3 Wall 0 200 200 9800 200 9800 9800 200 9800
LAYER 2 470 200 400 135
PART 1
AREA 1 Exterior 0 0 0 10000 0 10000 10000
"#;

    #[test]
    fn test_parse_plate() {
        let doc = from_compact(PLATE).unwrap();

        assert_eq!(doc.version, "1");
        assert_eq!(doc.meshes.len(), 1);

        let mesh = &doc.meshes[0];
        assert_eq!(mesh.name, "plate.stl");
        assert_eq!(mesh.role, MeshRole::Normal);
        assert_eq!(mesh.infill_line_spacing, 6000);
        assert_eq!(mesh.infill_pattern, InfillPattern::Triangle);
        assert_eq!(mesh.infill_angles, vec![45.0, 135.0]);
        assert_eq!(mesh.layers.len(), 2);

        let layer = &mesh.layers[0];
        assert_eq!(layer.height, 270.0);
        assert_eq!(layer.line_width, 400);
        assert_eq!(layer.parts[0].areas.len(), 3);

        let hole = &layer.parts[0].areas[1];
        assert_eq!(hole.id, 2);
        assert_eq!(hole.area_type, AreaType::Hole);
        assert_eq!(hole.points, vec![4000, 4000, 6000, 4000, 6000, 6000]);

        assert_eq!(mesh.layers[1].skin_orientation, 135.0);
    }

    #[test]
    fn test_roundtrip_plate() {
        let doc = from_compact(PLATE).unwrap();
        let text = to_compact(&doc);
        let restored = from_compact(&text).unwrap();
        assert_eq!(doc, restored);
    }

    #[test]
    fn test_roundtrip_fractional_values() {
        let mut doc = from_compact(PLATE).unwrap();
        doc.meshes[0].layers[0].height = 0.1 + 0.2;
        doc.meshes[0].layers[0].skin_orientation = -22.5;
        doc.meshes[0].infill_angles = vec![];

        let restored = from_compact(&to_compact(&doc)).unwrap();
        assert_eq!(doc, restored);
    }

    #[test]
    fn test_empty_angles_are_written() {
        let mut doc = from_compact(PLATE).unwrap();
        doc.meshes[0].infill_angles.clear();
        let text = to_compact(&doc);
        assert!(text.contains("MESH 1 \"plate.stl\" Normal 6000 Triangle []"));
    }

    #[test]
    fn test_quoted_name_with_escapes() {
        let mut doc = from_compact(PLATE).unwrap();
        doc.meshes[0].name = r#"my "odd" part\ v2.stl"#.to_string();

        let restored = from_compact(&to_compact(&doc)).unwrap();
        assert_eq!(restored.meshes[0].name, doc.meshes[0].name);
    }

    #[test]
    fn test_line_breaks_in_name_stay_on_one_line() {
        let mut doc = from_compact(PLATE).unwrap();
        doc.meshes[0].name = "part\nv2\r.stl".to_string();

        let text = to_compact(&doc);
        assert!(text.contains(r#"MESH 1 "part\nv2\r.stl" Normal"#));

        let restored = from_compact(&text).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_escaped_backslash_before_n() {
        let mut doc = from_compact(PLATE).unwrap();
        doc.meshes[0].name = r"C:\new\part.stl".to_string();

        let restored = from_compact(&to_compact(&doc)).unwrap();
        assert_eq!(restored.meshes[0].name, r"C:\new\part.stl");
    }

    #[test]
    fn test_layer_before_mesh() {
        let err = from_compact("LAYER 1 0 0 400 0").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("before any MESH"));
    }

    #[test]
    fn test_area_before_part() {
        let text = "MESH 1 \"a\" Normal 0 Grid []\n\
                    LAYER 1 0 0 400 0\n\
                    AREA 1 Exterior 0 0 0 1 0 1 1";
        let err = from_compact(text).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_odd_coordinates() {
        let text = "MESH 1 \"a\" Normal 0 Grid []\n\
                    LAYER 1 0 0 400 0\n\
                    PART 1\n\
                    AREA 1 Exterior 0 0 0 1";
        let err = from_compact(text).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("odd coordinate count"));
    }

    #[test]
    fn test_unknown_record() {
        let err = from_compact("\n\nVERTEX 1 2").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unknown record: VERTEX");
    }

    #[test]
    fn test_bad_enum() {
        let err = from_compact("MESH 1 \"a\" Support 0 Grid []").unwrap_err();
        assert!(err.message.contains("invalid mesh role"));
    }

    #[test]
    fn test_field_count() {
        let err = from_compact("MESH 1 \"a\" Normal 0 Grid").unwrap_err();
        assert_eq!(err.message, "MESH requires 6 fields, got 5");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = from_compact("MESH 1 \"a Normal 0 Grid []").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_split_keeps_quoted_spaces() {
        let parts = split_line_respecting_quotes(r#"MESH 1 "two words.stl" Normal"#, 1).unwrap();
        assert_eq!(parts, vec!["MESH", "1", "\"two words.stl\"", "Normal"]);
    }
}
