use bitvec::{bitbox, boxed::BitBox};

use crate::grid::{GridPos, GridSize};

/// Stores which fields of the board contain a mine.
///
/// Fields are addressed in row-major order; the map is fixed to the board
/// size it was created with.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct MineMap {
    size: GridSize,
    mines: BitBox,
}

impl MineMap {
    /// Creates a new [`MineMap`] without any mines.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            mines: bitbox![0; size.field_count().get()],
        }
    }

    /// The board size this map was created for.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Returns whether the given position contains a mine.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn is_mine(&self, pos: GridPos) -> bool {
        let field_index = pos
            .to_field_index(self.size)
            .expect("position out of bounds");
        self.mines[field_index]
    }

    /// Returns the total number of mines.
    pub fn mine_count(&self) -> usize {
        self.mines.count_ones()
    }

    /// Places a mine at the given position.
    ///
    /// Does nothing if the field is already mined.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn place_mine(&mut self, pos: GridPos) {
        let field_index = pos
            .to_field_index(self.size)
            .expect("position out of bounds");
        self.mines.set(field_index, true);
    }

    pub(crate) fn is_mine_at_index(&self, field_index: usize) -> bool {
        self.mines[field_index]
    }

    pub(crate) fn set_mine_at_index(&mut self, field_index: usize, is_mine: bool) {
        self.mines.set(field_index, is_mine);
    }

    /// Row-major indices of all mined fields.
    pub(crate) fn mine_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.mines.iter_ones()
    }
}
