/// Events emitted during a turn.
/// The presentation layer consumes these for sound and status messages;
/// animation reads the full `MoveResult` instead.

use std::fmt;

use crate::domain::direction::Direction;
use crate::domain::tile::{Position, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The direction had no effect. Nothing moved, nothing spawned.
    Blocked { direction: Direction },
    Slid { direction: Direction, tiles: usize },
    Merged { at: Position, value: Value },
    Spawned { at: Position, value: Value },
    Won { value: Value },
    Lost { score: u32 },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Blocked { direction } => write!(f, "{direction} blocked"),
            GameEvent::Slid { direction, tiles } => write!(f, "{tiles} tile(s) slid {direction}"),
            GameEvent::Merged { at, value } => write!(f, "merged {value} at ({}, {})", at.row, at.col),
            GameEvent::Spawned { at, value } => write!(f, "spawned {value} at ({}, {})", at.row, at.col),
            GameEvent::Won { value } => write!(f, "won with {value}"),
            GameEvent::Lost { score } => write!(f, "lost with score {score}"),
        }
    }
}
