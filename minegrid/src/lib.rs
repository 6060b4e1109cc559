//! Logic core of a minesweeper game.
//!
//! [`Minefield`](minefield::Minefield) owns the full state of a single game:
//! the mine layout, the per-field adjacency counts and the player-facing tile
//! states. It exposes reveal/flag/query operations to an embedding program,
//! which is responsible for rendering and input handling.

pub mod generator;
pub mod grid;
pub mod mine_map;
pub mod minefield;
pub mod tile;
