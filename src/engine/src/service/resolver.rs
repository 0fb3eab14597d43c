use common::{
    error::GameError,
    model::game::{resolve, Move, Outcome, Side},
};
use tracing::debug;

use crate::model::player::Player;

pub fn play_round(
    player_a: &mut Player,
    move_a: Move,
    player_b: &mut Player,
    move_b: Move,
) -> Outcome {
    let outcome = resolve(move_a, move_b);
    player_a.set_move(move_a);
    player_b.set_move(move_b);
    player_a.record_result(outcome.for_side(Side::A));
    player_b.record_result(outcome.for_side(Side::B));
    debug!(
        "{} ({}) vs {} ({}): {:?}",
        player_a.name(),
        move_a,
        player_b.name(),
        move_b,
        outcome
    );
    outcome
}

// Like `play_round`, but for moves that have not been validated yet. Both
// are converted before either player is touched.
pub fn play_raw_round<T>(
    player_a: &mut Player,
    move_a: T,
    player_b: &mut Player,
    move_b: T,
) -> Result<Outcome, GameError>
where
    T: TryInto<Move, Error = GameError>,
{
    let move_a = move_a.try_into()?;
    let move_b = move_b.try_into()?;
    Ok(play_round(player_a, move_a, player_b, move_b))
}

// Display line for a resolved round, e.g. "Alice wins! Rock beats Scissors."
pub fn describe(names: (&str, &str), moves: (Move, Move), outcome: Outcome) -> String {
    match outcome {
        Outcome::WinA => format!("{} wins! {} beats {}.", names.0, moves.0, moves.1),
        Outcome::WinB => format!("{} wins! {} beats {}.", names.1, moves.1, moves.0),
        Outcome::Draw => "It's a draw!".to_owned(),
    }
}
