use rand::{distributions::Bernoulli, seq::IteratorRandom, Rng};
use thiserror::Error;
use tracing::info;

use crate::{grid::GridSize, mine_map::MineMap};

/// How mines are distributed over a fresh board.
///
/// The two modes are mutually exclusive: either an exact total, or an
/// independent per-field probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MinePlacement {
    /// Exactly this many mines, chosen uniformly without replacement.
    Count(usize),
    /// Each field is mined independently with this probability.
    Density(f64),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot place {mines} mines on {fields} fields")]
    TooManyMines { mines: usize, fields: usize },
    #[error("mine probability {density} lies outside [0, 1]")]
    InvalidDensity { density: f64 },
}

/// Rolls a fresh mine layout for the given board size.
///
/// Randomness comes from the caller so that tests can pass a seeded RNG.
pub fn place_mines(
    size: GridSize,
    placement: MinePlacement,
    rng: &mut impl Rng,
) -> Result<MineMap, GenerateError> {
    let mut mines = MineMap::new(size);
    let fields = size.field_count().get();

    match placement {
        MinePlacement::Count(count) => {
            if count > fields {
                return Err(GenerateError::TooManyMines {
                    mines: count,
                    fields,
                });
            }
            for field_index in (0..fields).choose_multiple(rng, count) {
                mines.set_mine_at_index(field_index, true);
            }
        }
        MinePlacement::Density(density) => {
            let distribution = Bernoulli::new(density)
                .map_err(|_| GenerateError::InvalidDensity { density })?;
            for field_index in 0..fields {
                if rng.sample(distribution) {
                    mines.set_mine_at_index(field_index, true);
                }
            }
        }
    }

    info!(mine_count = mines.mine_count(), fields, "mine layout rolled");
    Ok(mines)
}
