use std::num::NonZeroUsize;

use itertools::iproduct;
use thiserror::Error;

/// Position of a field on the board.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Converts a row-major field index back into a position.
    ///
    /// Returns [`None`] if the index lies beyond the board.
    pub fn from_field_index(field_index: usize, size: GridSize) -> Option<Self> {
        let y = field_index / size.width;
        (y < size.height.get()).then(|| Self {
            x: field_index % size.width,
            y,
        })
    }

    /// Converts the position into a row-major field index.
    ///
    /// Returns [`None`] if the position lies outside the board.
    pub fn to_field_index(self, size: GridSize) -> Option<usize> {
        (self.x < size.width.get() && self.y < size.height.get())
            .then(|| self.x + self.y * size.width.get())
    }
}

/// The width and height of the board.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridSize {
    pub width: NonZeroUsize,
    pub height: NonZeroUsize,
}

impl GridSize {
    /// Creates a size from plain integers, rejecting zero dimensions.
    pub fn new(width: usize, height: usize) -> Result<Self, ZeroGridSize> {
        match (NonZeroUsize::new(width), NonZeroUsize::new(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(ZeroGridSize { width, height }),
        }
    }

    /// The total number of fields on the board.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows.
    pub fn field_count(self) -> NonZeroUsize {
        self.width
            .checked_mul(self.height)
            .expect("field count should not overflow")
    }

    /// Whether the position lies within the board.
    pub fn contains(self, pos: GridPos) -> bool {
        pos.x < self.width.get() && pos.y < self.height.get()
    }

    /// All in-bounds fields surrounding the given position.
    ///
    /// Edge and corner positions have fewer than 8 neighbors.
    pub fn neighbors(self, pos: GridPos) -> impl Iterator<Item = GridPos> {
        iproduct!(
            pos.x.saturating_sub(1)..=pos.x.saturating_add(1),
            pos.y.saturating_sub(1)..=pos.y.saturating_add(1)
        )
        .map(|(x, y)| GridPos { x, y })
        .filter(move |&neighbor| neighbor != pos && self.contains(neighbor))
    }
}

#[derive(Debug, Error)]
#[error("board dimensions must be positive, got {width}x{height}")]
pub struct ZeroGridSize {
    pub width: usize,
    pub height: usize,
}
