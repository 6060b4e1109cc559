use minegrid::{
    generator::MinePlacement,
    grid::{GridPos, GridSize},
    minefield::Minefield,
    tile::{Outcome, Tile},
};
use rand::{thread_rng, Rng};

/// Plays random reveals on a fresh board until the game ends, printing the
/// player-visible state after every move.
fn main() {
    tracing_subscriber::fmt().init();

    let size = GridSize::new(20, 15).expect("dimensions are nonzero");
    let mut minefield =
        Minefield::generate(size, MinePlacement::Count(40)).expect("placement fits the board");

    println!("{minefield}");

    let mut rng = thread_rng();
    while !minefield.outcome().is_over() {
        let pos = GridPos::new(
            rng.gen_range(0..size.width.get()),
            rng.gen_range(0..size.height.get()),
        );
        if minefield.tile(pos) != Tile::Covered {
            continue;
        }

        let newly_revealed = minefield.reveal(pos);
        println!(
            "revealed ({}, {}): {newly_revealed} new, {} of {} free fields open",
            pos.x,
            pos.y,
            minefield.reveal_count(),
            minefield.free_count()
        );
        println!("{minefield}");
    }

    match minefield.outcome() {
        Outcome::Won => println!("won after revealing all {} free fields", minefield.free_count()),
        Outcome::Lost => println!("lost with {} fields revealed", minefield.reveal_count()),
        Outcome::InProgress => unreachable!(),
    }
}
