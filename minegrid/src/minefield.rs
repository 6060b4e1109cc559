use std::fmt::{self, Display};

use rand::{thread_rng, Rng};
use tracing::{debug, info};

use crate::{
    generator::{place_mines, GenerateError, MinePlacement},
    grid::{GridPos, GridSize},
    mine_map::MineMap,
    tile::{Outcome, Tile},
};

/// Owns the full state of a single game: the mine layout, the per-field
/// adjacency counts and the player-facing tile states.
///
/// The layout and the adjacency counts are fixed at construction; everything
/// after that goes through [`Minefield::reveal`] and
/// [`Minefield::toggle_flag`]. Once the [`Outcome`] is terminal, both become
/// no-ops.
pub struct Minefield {
    mines: MineMap,
    counts: Vec<u8>,
    tiles: Vec<Tile>,
    reveal_count: usize,
    flag_count: usize,
    outcome: Outcome,
}

impl Minefield {
    /// Creates a minefield with a freshly rolled mine layout.
    pub fn generate(size: GridSize, placement: MinePlacement) -> Result<Self, GenerateError> {
        Self::generate_with(size, placement, &mut thread_rng())
    }

    /// Same as [`Minefield::generate`], but with a caller-supplied RNG.
    pub fn generate_with(
        size: GridSize,
        placement: MinePlacement,
        rng: &mut impl Rng,
    ) -> Result<Self, GenerateError> {
        Ok(Self::with_mines(place_mines(size, placement, rng)?))
    }

    /// Creates a minefield from an explicit mine layout.
    ///
    /// Adjacency counts for every field are computed here, once; they never
    /// change afterwards.
    pub fn with_mines(mines: MineMap) -> Self {
        let size = mines.size();
        let field_count = size.field_count().get();
        let counts = (0..field_count)
            .map(|field_index| {
                let pos = GridPos::from_field_index(field_index, size)
                    .expect("field index should be valid");
                size.neighbors(pos)
                    .filter(|&neighbor| mines.is_mine(neighbor))
                    .count() as u8
            })
            .collect();

        let mut minefield = Self {
            mines,
            counts,
            tiles: vec![Tile::Covered; field_count],
            reveal_count: 0,
            flag_count: 0,
            outcome: Outcome::InProgress,
        };
        // A board without free fields is already won.
        minefield.check_won();
        minefield
    }

    /// The board size.
    pub fn size(&self) -> GridSize {
        self.mines.size()
    }

    /// The total number of mines on the board.
    pub fn mine_count(&self) -> usize {
        self.mines.mine_count()
    }

    /// The total number of fields that do not contain a mine.
    pub fn free_count(&self) -> usize {
        self.size().field_count().get() - self.mine_count()
    }

    /// The total number of fields that have been revealed.
    pub fn reveal_count(&self) -> usize {
        self.reveal_count
    }

    /// The total number of placed flags.
    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    /// The number of flags left over when placing one per mine.
    ///
    /// Saturates at zero once the player has flagged more fields than there
    /// are mines.
    pub fn remaining_flags(&self) -> usize {
        self.mine_count().saturating_sub(self.flag_count)
    }

    /// The current state of the game.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The state of the given field.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn tile(&self, pos: GridPos) -> Tile {
        self.tiles[self.field_index(pos)]
    }

    /// The number of mines among the up-to-8 fields surrounding `pos`.
    ///
    /// Only available once the field is revealed; covered and flagged fields
    /// return [`None`] so the layout cannot be read off the API.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn adjacent_mines(&self, pos: GridPos) -> Option<u8> {
        let field_index = self.field_index(pos);
        (self.tiles[field_index] == Tile::Revealed).then(|| self.counts[field_index])
    }

    /// The positions of all mines, once the game is over.
    ///
    /// Returns [`None`] while the game is still in progress.
    pub fn mine_positions(&self) -> Option<impl Iterator<Item = GridPos> + '_> {
        let size = self.size();
        self.outcome.is_over().then(move || {
            self.mines.mine_indices().map(move |field_index| {
                GridPos::from_field_index(field_index, size).expect("mine index should be valid")
            })
        })
    }

    /// Reveals the given field, returning how many fields this action newly
    /// revealed.
    ///
    /// Revealing a mine ends the game on the spot; no other field changes.
    /// Revealing a field without adjacent mines floods into the surrounding
    /// zero-count region, stopping at (but including) its numbered border.
    /// Returns `0` when the game is already over or when the field is
    /// flagged or not covered anymore.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn reveal(&mut self, pos: GridPos) -> usize {
        let field_index = self.field_index(pos);
        if self.outcome.is_over() || self.tiles[field_index] != Tile::Covered {
            return 0;
        }

        if self.mines.is_mine_at_index(field_index) {
            self.tiles[field_index] = Tile::Exploded;
            self.outcome = Outcome::Lost;
            info!(x = pos.x, y = pos.y, "mine revealed, game lost");
            return 1;
        }

        let newly_revealed = self.flood_reveal(field_index);
        debug!(x = pos.x, y = pos.y, newly_revealed, "field revealed");
        self.check_won();
        newly_revealed
    }

    /// Reveals the field at `start` and, across zero-count fields, its whole
    /// neighborhood.
    ///
    /// Runs on an explicit work stack so the call depth stays flat no matter
    /// the board size. The covered-check on pop means every field is revealed
    /// at most once, which bounds the traversal.
    fn flood_reveal(&mut self, start: usize) -> usize {
        let size = self.size();
        let mut pending = vec![start];
        let mut newly_revealed = 0;

        while let Some(field_index) = pending.pop() {
            // Also skips flagged fields: a flag has to be removed by hand
            // before the field can be revealed.
            if self.tiles[field_index] != Tile::Covered {
                continue;
            }
            self.tiles[field_index] = Tile::Revealed;
            self.reveal_count += 1;
            newly_revealed += 1;

            // A zero-count field never borders a mine, so expanding here can
            // never reveal one.
            if self.counts[field_index] != 0 {
                continue;
            }
            let pos = GridPos::from_field_index(field_index, size)
                .expect("field index should be valid");
            pending.extend(size.neighbors(pos).map(|neighbor| {
                neighbor
                    .to_field_index(size)
                    .expect("neighbors should be in bounds")
            }));
        }

        newly_revealed
    }

    /// Toggles the flag on the given field, returning its state afterwards.
    ///
    /// Does nothing once the game is over or when the field is already
    /// revealed.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn toggle_flag(&mut self, pos: GridPos) -> Tile {
        let field_index = self.field_index(pos);
        if self.outcome.is_over() {
            return self.tiles[field_index];
        }

        match self.tiles[field_index] {
            Tile::Covered => {
                self.tiles[field_index] = Tile::Flagged;
                self.flag_count += 1;
                debug!(x = pos.x, y = pos.y, "flag placed");
            }
            Tile::Flagged => {
                self.tiles[field_index] = Tile::Covered;
                self.flag_count -= 1;
                debug!(x = pos.x, y = pos.y, "flag removed");
            }
            Tile::Revealed | Tile::Exploded => {}
        }
        self.tiles[field_index]
    }

    fn check_won(&mut self) {
        if self.outcome == Outcome::InProgress && self.reveal_count == self.free_count() {
            self.outcome = Outcome::Won;
            info!(reveal_count = self.reveal_count, "all free fields revealed, game won");
        }
    }

    fn field_index(&self, pos: GridPos) -> usize {
        pos.to_field_index(self.size())
            .expect("position out of bounds")
    }
}

impl Display for Minefield {
    /// Renders the player-visible board, one row per line.
    ///
    /// Mines only show up once the game is over.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for y in 0..size.height.get() {
            for x in 0..size.width.get() {
                let pos = GridPos::new(x, y);
                let field_index = pos.to_field_index(size).expect("position should be valid");
                let glyph = match self.tiles[field_index] {
                    Tile::Covered if self.outcome.is_over() && self.mines.is_mine(pos) => '*',
                    Tile::Covered => '#',
                    Tile::Flagged => 'F',
                    Tile::Exploded => '!',
                    Tile::Revealed => match self.counts[field_index] {
                        0 => '.',
                        count => char::from(b'0' + count),
                    },
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn size(width: usize, height: usize) -> GridSize {
        GridSize::new(width, height).unwrap()
    }

    fn minefield(width: usize, height: usize, mines: &[(usize, usize)]) -> Minefield {
        let mut map = MineMap::new(size(width, height));
        for &(x, y) in mines {
            map.place_mine(GridPos::new(x, y));
        }
        Minefield::with_mines(map)
    }

    #[test]
    fn adjacency_counts_match_a_brute_force_recount() {
        let mut rng = StdRng::seed_from_u64(7);
        let board_size = size(16, 16);
        let mines = place_mines(board_size, MinePlacement::Count(40), &mut rng).unwrap();
        let minefield = Minefield::with_mines(mines.clone());

        for field_index in 0..board_size.field_count().get() {
            let pos = GridPos::from_field_index(field_index, board_size).unwrap();
            let expected = board_size
                .neighbors(pos)
                .filter(|&neighbor| mines.is_mine(neighbor))
                .count();
            assert_eq!(usize::from(minefield.counts[field_index]), expected);
        }
    }

    #[test]
    fn reveal_next_to_mine_reveals_a_single_field() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 1);
        assert_eq!(minefield.tile(GridPos::new(0, 0)), Tile::Revealed);
        assert_eq!(minefield.adjacent_mines(GridPos::new(0, 0)), Some(1));
        assert_eq!(minefield.outcome(), Outcome::InProgress);
        // Nothing else changed.
        assert_eq!(minefield.reveal_count(), 1);
        assert_eq!(minefield.tile(GridPos::new(1, 0)), Tile::Covered);
        assert_eq!(minefield.tile(GridPos::new(2, 2)), Tile::Covered);
    }

    #[test]
    fn empty_board_floods_in_one_reveal_and_wins() {
        let mut minefield = minefield(5, 5, &[]);
        assert_eq!(minefield.reveal(GridPos::new(2, 2)), 25);
        assert_eq!(minefield.reveal_count(), 25);
        assert_eq!(minefield.outcome(), Outcome::Won);
    }

    #[test]
    fn flood_stops_at_the_numbered_border() {
        // 7x1 strip with a mine at x=4: the zero region 0..=2 plus the
        // bordering `1` at x=3 reveal, fields past the mine do not.
        let mut minefield = minefield(7, 1, &[(4, 0)]);
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 4);
        assert_eq!(minefield.adjacent_mines(GridPos::new(3, 0)), Some(1));
        assert_eq!(minefield.tile(GridPos::new(4, 0)), Tile::Covered);
        assert_eq!(minefield.tile(GridPos::new(5, 0)), Tile::Covered);
        assert_eq!(minefield.tile(GridPos::new(6, 0)), Tile::Covered);
        assert_eq!(minefield.outcome(), Outcome::InProgress);
    }

    #[test]
    fn revealing_a_mine_loses_and_freezes_the_board() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        assert_eq!(minefield.reveal(GridPos::new(1, 1)), 1);
        assert_eq!(minefield.tile(GridPos::new(1, 1)), Tile::Exploded);
        assert_eq!(minefield.outcome(), Outcome::Lost);

        // Frozen: reveals and flags are no-ops from here on.
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 0);
        assert_eq!(minefield.tile(GridPos::new(0, 0)), Tile::Covered);
        assert_eq!(minefield.toggle_flag(GridPos::new(0, 0)), Tile::Covered);
        assert_eq!(minefield.flag_count(), 0);
    }

    #[test]
    fn won_exactly_on_the_last_free_field() {
        let mut minefield = minefield(2, 2, &[(0, 0)]);
        assert_eq!(minefield.reveal(GridPos::new(1, 0)), 1);
        assert_eq!(minefield.outcome(), Outcome::InProgress);
        assert_eq!(minefield.reveal(GridPos::new(0, 1)), 1);
        assert_eq!(minefield.outcome(), Outcome::InProgress);
        assert_eq!(minefield.reveal(GridPos::new(1, 1)), 1);
        assert_eq!(minefield.outcome(), Outcome::Won);
    }

    #[test]
    fn flag_blocks_reveal_until_removed() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        minefield.toggle_flag(GridPos::new(0, 0));
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 0);
        assert_eq!(minefield.tile(GridPos::new(0, 0)), Tile::Flagged);

        minefield.toggle_flag(GridPos::new(0, 0));
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 1);
        assert_eq!(minefield.tile(GridPos::new(0, 0)), Tile::Revealed);
    }

    #[test]
    fn flagged_field_survives_the_flood() {
        let mut minefield = minefield(5, 5, &[]);
        minefield.toggle_flag(GridPos::new(1, 1));
        assert_eq!(minefield.reveal(GridPos::new(3, 3)), 24);
        assert_eq!(minefield.tile(GridPos::new(1, 1)), Tile::Flagged);
        assert_eq!(minefield.outcome(), Outcome::InProgress);

        // Unflagging and revealing the last field finishes the game.
        minefield.toggle_flag(GridPos::new(1, 1));
        assert_eq!(minefield.reveal(GridPos::new(1, 1)), 1);
        assert_eq!(minefield.outcome(), Outcome::Won);
    }

    #[test]
    fn repeated_reveal_is_a_no_op() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 1);
        assert_eq!(minefield.reveal(GridPos::new(0, 0)), 0);
        assert_eq!(minefield.reveal_count(), 1);
    }

    #[test]
    fn flags_do_not_stack_on_revealed_fields() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        minefield.reveal(GridPos::new(0, 0));
        assert_eq!(minefield.toggle_flag(GridPos::new(0, 0)), Tile::Revealed);
        assert_eq!(minefield.flag_count(), 0);
    }

    #[test]
    fn flag_counters_track_toggles() {
        let mut minefield = minefield(3, 3, &[(1, 1), (2, 2)]);
        assert_eq!(minefield.remaining_flags(), 2);
        minefield.toggle_flag(GridPos::new(0, 0));
        minefield.toggle_flag(GridPos::new(0, 1));
        assert_eq!(minefield.flag_count(), 2);
        assert_eq!(minefield.remaining_flags(), 0);
        minefield.toggle_flag(GridPos::new(0, 2));
        assert_eq!(minefield.remaining_flags(), 0);
        minefield.toggle_flag(GridPos::new(0, 0));
        assert_eq!(minefield.flag_count(), 2);
    }

    #[test]
    fn adjacency_is_hidden_until_revealed() {
        let mut minefield = minefield(3, 3, &[(1, 1)]);
        assert_eq!(minefield.adjacent_mines(GridPos::new(0, 0)), None);
        minefield.toggle_flag(GridPos::new(0, 1));
        assert_eq!(minefield.adjacent_mines(GridPos::new(0, 1)), None);
        minefield.reveal(GridPos::new(0, 0));
        assert_eq!(minefield.adjacent_mines(GridPos::new(0, 0)), Some(1));
    }

    #[test]
    fn mine_positions_only_show_after_the_game() {
        let mut minefield = minefield(3, 3, &[(1, 1), (2, 0)]);
        assert!(minefield.mine_positions().is_none());

        minefield.reveal(GridPos::new(1, 1));
        // Row-major order, as stored.
        let positions: Vec<_> = minefield.mine_positions().unwrap().collect();
        assert_eq!(positions, vec![GridPos::new(2, 0), GridPos::new(1, 1)]);
    }

    #[test]
    fn fully_mined_board_is_won_immediately() {
        let minefield = minefield(2, 2, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(minefield.free_count(), 0);
        assert_eq!(minefield.outcome(), Outcome::Won);
    }

    #[test]
    fn generated_board_carries_the_requested_layout() {
        let mut rng = StdRng::seed_from_u64(3);
        let minefield =
            Minefield::generate_with(size(9, 9), MinePlacement::Count(10), &mut rng).unwrap();
        assert_eq!(minefield.mine_count(), 10);
        assert_eq!(minefield.free_count(), 71);
        assert_eq!(minefield.outcome(), Outcome::InProgress);
    }

    #[test]
    fn display_hides_the_layout_while_in_progress() {
        let mut minefield = minefield(2, 1, &[(1, 0)]);
        assert_eq!(minefield.to_string(), "##\n");
        minefield.reveal(GridPos::new(0, 0));
        assert_eq!(minefield.to_string(), "1#\n");
        minefield.reveal(GridPos::new(1, 0));
        assert_eq!(minefield.to_string(), "1!\n");
    }

    #[test]
    #[should_panic(expected = "position out of bounds")]
    fn out_of_bounds_reveal_panics() {
        let mut minefield = minefield(3, 3, &[]);
        minefield.reveal(GridPos::new(3, 0));
    }
}
