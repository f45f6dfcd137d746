/// Game: the complete state of one running game.
///
/// Owns the board and the RNG that feeds its spawns, so any number of games
/// can live side by side. The board is the only mutable game state; the score
/// is always read back from it.
///
/// ## Phases
///
/// ┌──────────┬──────────────────────────────────────────────┐
/// │ Playing  │ accepts moves                                │
/// │ Won      │ target reached; waits for keep-playing/restart│
/// │ Lost     │ full board, no legal move; waits for restart  │
/// └──────────┴──────────────────────────────────────────────┘
/// `Won` is entered once per game. After the player keeps playing, reaching
/// the target again does not interrupt.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::board::{Board, MoveResult, Spawn, GRID_SIZE};
use crate::domain::tile::Value;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

pub struct Game<const N: usize = GRID_SIZE> {
    pub board: Board<N>,
    pub rng: StdRng,
    pub phase: Phase,
    pub win_target: Value,
    /// Player chose to continue after winning.
    pub keep_playing: bool,
    /// Accepted (changing) moves this game.
    pub moves: u64,
    /// Highest score seen by this instance, across restarts.
    pub best: u32,
    /// Outcome of the last processed move, for animation.
    pub last_move: Option<MoveResult>,
    /// Tiles placed when the current game started.
    pub opening: [Option<Spawn>; 2],
}

impl<const N: usize> Game<N> {
    /// Start a game. `seed = None` draws the RNG seed from the OS.
    pub fn new(seed: Option<u64>, win_target: Value) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng, win_target)
    }

    pub fn with_rng(mut rng: StdRng, win_target: Value) -> Self {
        let (board, opening) = Board::new_game(&mut rng);
        Game {
            best: board.score(),
            board,
            rng,
            phase: Phase::Playing,
            win_target,
            keep_playing: false,
            moves: 0,
            last_move: None,
            opening,
        }
    }

    pub fn score(&self) -> u32 {
        self.board.score()
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Lost
    }

    /// Throw the board away and seed a fresh one. The RNG keeps running,
    /// so a restart deals a new game rather than replaying the old one.
    pub fn reset(&mut self) {
        let (board, opening) = Board::new_game(&mut self.rng);
        self.board = board;
        self.opening = opening;
        self.phase = Phase::Playing;
        self.keep_playing = false;
        self.moves = 0;
        self.last_move = None;
        self.best = self.best.max(self.board.score());
    }
}
