//! Polygon classification for one layer part.
//!
//! Every ring of a part is labelled with an [`AreaType`] in a fixed
//! precedence order, which is also the emission and id order:
//!
//! 1. `Exterior`: the outer boundary ring
//! 2. `Hole`: remaining outline rings
//! 3. `Wall`: insets from outermost depth to innermost
//! 4. `Skin`: per island, its boundary then its holes
//! 5. `Infill`
//! 6. `Gap`: outline gaps, then perimeter gaps
//!
//! Rings are passed through untouched; nothing is reordered, merged, or
//! dropped.

use teton_ir::{AreaRecord, AreaType};

use crate::ids::IdAllocator;
use crate::snapshot::{Polygon, SliceLayerPart};

/// Label every ring of `part`, in emission order.
pub fn classify_part(part: &SliceLayerPart) -> Vec<(AreaType, &Polygon)> {
    let mut out = Vec::with_capacity(ring_count(part));

    let mut outline = part.outline.iter();
    if let Some(exterior) = outline.next() {
        out.push((AreaType::Exterior, exterior));
    }
    out.extend(outline.map(|ring| (AreaType::Hole, ring)));

    out.extend(
        part.insets
            .iter()
            .flatten()
            .map(|ring| (AreaType::Wall, ring)),
    );

    // The island boundary is outline[0]; its holes follow directly.
    out.extend(
        part.skin_parts
            .iter()
            .flat_map(|skin| &skin.outline)
            .map(|ring| (AreaType::Skin, ring)),
    );

    out.extend(part.infill_area.iter().map(|ring| (AreaType::Infill, ring)));

    out.extend(
        part.outline_gaps
            .iter()
            .chain(&part.perimeter_gaps)
            .map(|ring| (AreaType::Gap, ring)),
    );

    out
}

/// Classify `part` and stamp each ring as an [`AreaRecord`] with ids
/// `1..=N` in emission order.
pub fn part_areas(part: &SliceLayerPart) -> Vec<AreaRecord> {
    let mut ids = IdAllocator::new();

    classify_part(part)
        .into_iter()
        .map(|(area_type, ring)| AreaRecord {
            id: ids.allocate(),
            area_type,
            // TODO: resolve the enclosing area once consumers need nesting.
            inside: 0,
            points: ring.flat_coords(),
        })
        .collect()
}

/// Total number of rings across all groups of a part.
pub fn ring_count(part: &SliceLayerPart) -> usize {
    part.outline.len()
        + part.insets.iter().map(Vec::len).sum::<usize>()
        + part.skin_parts.iter().map(|s| s.outline.len()).sum::<usize>()
        + part.infill_area.len()
        + part.outline_gaps.len()
        + part.perimeter_gaps.len()
}
