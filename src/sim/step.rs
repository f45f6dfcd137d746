/// The turn function: resolves one requested direction.
///
/// Processing order:
///   1. Validating: reject when not Playing, or when the direction is blocked
///   2. Mutating: slide and merge on the board
///   3. Spawning: one new tile on a changing move
///   4. Terminal check: Won (once per game), then Lost
///
/// Stages 1–3 happen inside `Board::try_move`; this layer turns the
/// `MoveResult` into events, bookkeeping and phase changes.

use log::{debug, info};

use crate::domain::direction::Direction;
use super::event::GameEvent;
use super::world::{Game, Phase};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<const N: usize>(game: &mut Game<N>, direction: Direction) -> Vec<GameEvent> {
    if game.phase != Phase::Playing {
        return vec![];
    }

    let result = game.board.try_move(direction, &mut game.rng);
    if !result.changed {
        debug!("move {direction} blocked");
        return vec![GameEvent::Blocked { direction }];
    }

    game.moves += 1;
    let mut events = Vec::with_capacity(4);

    let sliding = result.moves.iter().filter(|m| !m.merged).count();
    if sliding > 0 {
        events.push(GameEvent::Slid { direction, tiles: sliding });
    }
    for (at, value) in result.merges() {
        events.push(GameEvent::Merged { at, value });
    }
    if let Some(spawn) = result.spawned {
        events.push(GameEvent::Spawned { at: spawn.at, value: spawn.value });
    }
    debug!(
        "move #{} {}: {} merges (+{}), spawn {:?}, {} tiles\n{}",
        game.moves,
        result.direction,
        result.merge_count(),
        result.gain,
        result.spawned,
        game.board.tile_count(),
        game.board
    );

    game.last_move = Some(result);
    game.best = game.best.max(game.score());

    resolve_terminal(game, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Terminal states
// ══════════════════════════════════════════════════════════════

fn resolve_terminal<const N: usize>(game: &mut Game<N>, events: &mut Vec<GameEvent>) {
    if !game.keep_playing && game.board.is_won(game.win_target) {
        game.phase = Phase::Won;
        let value = game.board.max_tile();
        info!("reached {value} after {} moves (score {})", game.moves, game.score());
        events.push(GameEvent::Won { value });
        return;
    }
    if game.board.is_lost() {
        game.phase = Phase::Lost;
        let score = game.score();
        info!("game over after {} moves (score {score}, best tile {})", game.moves, game.board.max_tile());
        events.push(GameEvent::Lost { score });
    }
}

/// Leave the Won overlay and continue the same board.
/// A winning board can still be full and stuck, so re-check for a loss.
pub fn keep_playing<const N: usize>(game: &mut Game<N>) -> Vec<GameEvent> {
    if game.phase != Phase::Won {
        return vec![];
    }
    game.keep_playing = true;
    game.phase = Phase::Playing;
    info!("continuing past {}", game.win_target);

    let mut events = Vec::new();
    resolve_terminal(game, &mut events);
    events
}

/// Start over on a fresh board.
pub fn restart<const N: usize>(game: &mut Game<N>) {
    game.reset();
    info!("new game (best so far {})", game.best);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
