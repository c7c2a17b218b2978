//! Scoped record identifiers.

use teton_ir::RecordId;

/// Hands out dense ids `1, 2, 3, ...` for the records of one scope.
///
/// Create a fresh allocator at each scope boundary (per document for meshes,
/// per mesh for layers, per layer for parts, per part for areas).
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: RecordId,
}

impl IdAllocator {
    /// Allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the next id and advance.
    pub fn allocate(&mut self) -> RecordId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
