//! Three-axis flag grid describing a factory's spatial footprint.
//!
//! Each cell carries [`CellFlags`]: whether a block is present, whether it may
//! change, and whether it has changed since last observed. The grid is built
//! once with [`LayoutBuilder`]; afterwards only the dirty flag can be toggled.

use std::ops::{BitOr, BitOrAssign};

/// Per-cell flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const EMPTY: CellFlags = CellFlags(0);
    pub const PRESENT: CellFlags = CellFlags(0b100);
    pub const MUTABLE: CellFlags = CellFlags(0b010);
    pub const DIRTY: CellFlags = CellFlags(0b001);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn without(self, other: CellFlags) -> CellFlags {
        CellFlags(self.0 & !other.0)
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellFlags {
    fn bitor_assign(&mut self, rhs: CellFlags) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout dimensions must be non-zero, got {x}x{y}x{z}")]
    ZeroSized { x: usize, y: usize, z: usize },
    #[error("cell ({x}, {y}, {z}) is outside the layout")]
    OutOfBounds { x: usize, y: usize, z: usize },
}

/// Dense x-major flag grid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Layout {
    size: [usize; 3],
    cells: Vec<CellFlags>,
}

impl Layout {
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    fn index(&self, x: usize, y: usize, z: usize) -> Result<usize, LayoutError> {
        let [sx, sy, sz] = self.size;
        if x >= sx || y >= sy || z >= sz {
            return Err(LayoutError::OutOfBounds { x, y, z });
        }
        Ok((x * sy + y) * sz + z)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<CellFlags, LayoutError> {
        Ok(self.cells[self.index(x, y, z)?])
    }

    pub fn mark_dirty(&mut self, x: usize, y: usize, z: usize) -> Result<(), LayoutError> {
        let i = self.index(x, y, z)?;
        self.cells[i] |= CellFlags::DIRTY;
        Ok(())
    }

    /// Clears every dirty flag, returning how many cells were dirty.
    pub fn clear_dirty(&mut self) -> usize {
        let mut cleared = 0;
        for cell in &mut self.cells {
            if cell.contains(CellFlags::DIRTY) {
                *cell = cell.without(CellFlags::DIRTY);
                cleared += 1;
            }
        }
        cleared
    }

    pub fn present_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.contains(CellFlags::PRESENT))
            .count()
    }
}

/// Builds a [`Layout`]. Flag setters record the first out-of-bounds cell and
/// report it from [`LayoutBuilder::build`].
#[derive(Debug)]
pub struct LayoutBuilder {
    layout: Layout,
    error: Option<LayoutError>,
}

impl LayoutBuilder {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        let error = (x == 0 || y == 0 || z == 0).then_some(LayoutError::ZeroSized { x, y, z });
        Self {
            layout: Layout {
                size: [x, y, z],
                cells: vec![CellFlags::EMPTY; x * y * z],
            },
            error,
        }
    }

    pub fn flag(mut self, x: usize, y: usize, z: usize, flags: CellFlags) -> Self {
        if self.error.is_none() {
            match self.layout.index(x, y, z) {
                Ok(i) => self.layout.cells[i] |= flags,
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    pub fn present(self, x: usize, y: usize, z: usize) -> Self {
        self.flag(x, y, z, CellFlags::PRESENT)
    }

    pub fn mutable(self, x: usize, y: usize, z: usize) -> Self {
        self.flag(x, y, z, CellFlags::MUTABLE)
    }

    pub fn dirty(self, x: usize, y: usize, z: usize) -> Self {
        self.flag(x, y, z, CellFlags::DIRTY)
    }

    pub fn build(self) -> Result<Layout, LayoutError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.layout),
        }
    }
}
