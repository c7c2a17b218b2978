//! End-to-end export of a stored slice snapshot.

use std::collections::HashMap;
use std::fs;

use approx::assert_relative_eq;
use teton::{
    build_document, export, export_to, AreaType, CollectingSink, Document, ExportError, Format,
    InfillPattern, MeshRole, Serializer, SliceData,
};

const SNAPSHOT: &str = include_str!("fixtures/bracket_with_support.json");

fn snapshot() -> SliceData {
    SliceData::from_json(SNAPSHOT).expect("fixture parses")
}

fn env_with_dir(dir: &std::path::Path) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("CURA_POLY_DIR".to_string(), dir.display().to_string());
    env
}

#[test]
fn builds_expected_tree() {
    let mut sink = CollectingSink::new();
    let doc = build_document(&snapshot(), &mut sink).unwrap();

    assert_eq!(doc.meshes.len(), 2);

    let support = &doc.meshes[0];
    assert_eq!(support.id, 1);
    assert_eq!(support.role, MeshRole::Unknown);
    assert_eq!(support.layers.len(), 1);
    assert_relative_eq!(support.layers[0].skin_orientation, 45.0);

    let bracket = &doc.meshes[1];
    assert_eq!(bracket.id, 2);
    assert_eq!(bracket.role, MeshRole::Normal);
    assert_eq!(bracket.infill_pattern, InfillPattern::Triangle);
    assert_eq!(bracket.infill_line_spacing, 6000);
    assert_eq!(bracket.infill_angles, vec![60.0, 0.0, 120.0]);

    // Four layers in the snapshot, max filled index 2.
    let layer_ids: Vec<u64> = bracket.layers.iter().map(|l| l.id).collect();
    assert_eq!(layer_ids, vec![1, 2, 3]);
    assert_relative_eq!(bracket.layers[1].height, 500.0);
    assert_relative_eq!(bracket.layers[1].line_thickness, 200.0);
    assert!(bracket.layers.iter().all(|l| l.skin_orientation == 0.0));
    assert!(bracket.layers.iter().all(|l| l.line_width == 400));

    use AreaType::*;
    let first_part = &bracket.layers[0].parts[0];
    let types: Vec<AreaType> = first_part.areas.iter().map(|a| a.area_type).collect();
    assert_eq!(
        types,
        vec![Exterior, Hole, Wall, Wall, Wall, Skin, Skin, Gap, Gap]
    );

    let second_layer = &bracket.layers[1];
    assert_eq!(second_layer.parts.len(), 2);
    assert_eq!(second_layer.parts[1].id, 2);
    assert_eq!(second_layer.parts[1].areas.len(), 1);
    assert!(bracket.layers[2].parts.is_empty());

    assert!(sink.has_warning("no skin angles"));
    assert_eq!(sink.warnings().count(), 1);
}

#[test]
fn every_part_satisfies_area_invariants() {
    let mut sink = CollectingSink::new();
    let doc = build_document(&snapshot(), &mut sink).unwrap();

    for mesh in &doc.meshes {
        for layer in &mesh.layers {
            for (p, part) in layer.parts.iter().enumerate() {
                assert_eq!(part.id, p as u64 + 1);
                assert_eq!(part.areas[0].area_type, AreaType::Exterior);
                assert_eq!(
                    part.areas
                        .iter()
                        .filter(|a| a.area_type == AreaType::Exterior)
                        .count(),
                    1
                );
                for (a, area) in part.areas.iter().enumerate() {
                    assert_eq!(area.id, a as u64 + 1);
                    assert_eq!(area.inside, 0);
                    assert_eq!(area.points.len() % 2, 0);
                    assert!(area.point_count() >= 3);
                }
            }
        }
    }
}

#[test]
fn export_writes_to_resolved_path() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_with_dir(dir.path());
    let mut sink = CollectingSink::new();

    let path = export(&snapshot(), &Format::Json, &mut sink, &env).unwrap();

    // Exactly one regular mesh, so its name is used.
    assert_eq!(path, dir.path().join("bracket.json"));
    let written = Document::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, build_document(&snapshot(), &mut CollectingSink::new()).unwrap());
}

#[test]
fn compact_export_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_with_dir(dir.path());

    let path = export(&snapshot(), &Format::Compact, &mut CollectingSink::new(), &env).unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("teton"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# teton 1\n"));
    let parsed = Format::Compact.parse(&text).unwrap();
    assert_eq!(parsed, build_document(&snapshot(), &mut CollectingSink::new()).unwrap());
}

#[test]
fn two_regular_meshes_use_default_name() {
    let mut data = snapshot();
    data.meshes[0].settings.set("support_mesh", false);

    let dir = tempfile::tempdir().unwrap();
    let path = export(&data, &Format::Json, &mut CollectingSink::new(), &env_with_dir(dir.path()))
        .unwrap();
    assert_eq!(path, dir.path().join("teton-mesh.json"));
}

#[test]
fn missing_setting_writes_nothing() {
    let mut data = snapshot();
    data.meshes[1].settings.remove("infill_line_distance");

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    let err = export_to(&data, &Format::Json, &mut CollectingSink::new(), &out).unwrap_err();

    match err {
        ExportError::MissingSetting { mesh, name } => {
            assert_eq!(mesh, "bracket.stl");
            assert_eq!(name, "infill_line_distance");
        }
        other => panic!("expected MissingSetting, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn json_output_keeps_every_field() {
    let doc = build_document(&snapshot(), &mut CollectingSink::new()).unwrap();
    let text = String::from_utf8(Format::Json.render(&doc).unwrap()).unwrap();

    for field in [
        "\"id\"",
        "\"name\"",
        "\"role\": \"Unknown\"",
        "\"infill_line_spacing\": 0",
        "\"infill_pattern\": \"Triangle\"",
        "\"infill_angles\": []",
        "\"height\"",
        "\"line_thickness\"",
        "\"line_width\": 400",
        "\"skin_orientation\": 0.0",
        "\"parts\": []",
        "\"type\": \"Gap\"",
        "\"inside\": 0",
        "\"points\"",
    ] {
        assert!(text.contains(field), "missing {field}");
    }
}
