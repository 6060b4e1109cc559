/// Player-facing state of a single field.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Tile {
    /// Not yet revealed or flagged.
    #[default]
    Covered,
    /// Marked by the player; must be unflagged before it can be revealed.
    Flagged,
    /// Revealed and free of a mine.
    Revealed,
    /// A revealed mine. Ends the game.
    Exploded,
}

/// State of the game as a whole, derived from the revealed fields.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    InProgress,
    /// A mine was revealed.
    Lost,
    /// Every free field is revealed.
    Won,
}

impl Outcome {
    /// Whether the game has ended and the board is frozen.
    pub fn is_over(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}
