/// Move animation: a per-frame step function built from a `MoveResult`.
///
/// Two stages, one tick per frame:
///   Slide: each moving tile travels from its source slot to its destination
///   Pop:   merged and freshly spawned tiles grow by one cell, then settle
///
/// The board already holds the post-move state. While sliding, the renderer
/// hides every destination (and the spawn) and draws the travelling sprites
/// with their pre-merge values instead. Input is not blocked: commands queue
/// up in `InputState` and are taken once the animation is done.

use crate::config::SpeedConfig;
use crate::domain::board::{MoveResult, Spawn};
use crate::domain::tile::{Position, Value};

/// A tile drawn between slots. `row`/`col` are fractional slot coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub row: f32,
    pub col: f32,
    pub value: Value,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    Slide,
    Pop,
    Done,
}

#[derive(Clone, Copy, Debug)]
struct Travel {
    from: Position,
    to: Position,
    value: Value,
}

#[derive(Clone, Debug)]
pub struct Animation {
    travels: Vec<Travel>,
    hidden: Vec<Position>,
    pops: Vec<Position>,
    tick: u32,
    slide_ticks: u32,
    pop_ticks: u32,
}

impl Animation {
    pub fn from_move(result: &MoveResult, speed: &SpeedConfig) -> Self {
        let travels = result
            .moves
            .iter()
            .map(|m| Travel { from: m.from, to: m.to, value: m.source_value() })
            .collect();
        let mut hidden: Vec<Position> = result.moves.iter().map(|m| m.to).collect();
        let mut pops: Vec<Position> = result.merges().map(|(at, _)| at).collect();
        if let Some(spawn) = result.spawned {
            hidden.push(spawn.at);
            pops.push(spawn.at);
        }
        hidden.sort_unstable();
        hidden.dedup();

        Animation {
            travels,
            hidden,
            pops,
            tick: 0,
            slide_ticks: speed.slide_ticks,
            pop_ticks: speed.pop_ticks,
        }
    }

    /// Opening tiles of a new game: pop only.
    pub fn from_spawns(spawns: &[Option<Spawn>], speed: &SpeedConfig) -> Self {
        Animation {
            travels: Vec::new(),
            hidden: Vec::new(),
            pops: spawns.iter().flatten().map(|s| s.at).collect(),
            tick: 0,
            slide_ticks: speed.slide_ticks,
            pop_ticks: speed.pop_ticks,
        }
    }

    fn slide_len(&self) -> u32 {
        if self.travels.is_empty() { 0 } else { self.slide_ticks }
    }

    fn total(&self) -> u32 {
        let pop = if self.pops.is_empty() { 0 } else { self.pop_ticks };
        self.slide_len() + pop
    }

    pub fn stage(&self) -> Stage {
        if self.tick < self.slide_len() {
            Stage::Slide
        } else if self.tick < self.total() {
            Stage::Pop
        } else {
            Stage::Done
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage() == Stage::Done
    }

    /// Advance one frame.
    pub fn advance(&mut self) {
        if !self.is_done() {
            self.tick += 1;
        }
    }

    /// Jump to the end.
    pub fn finish(&mut self) {
        self.tick = self.total();
    }

    /// Should the renderer skip the board value at `pos` this frame?
    pub fn is_hidden(&self, pos: Position) -> bool {
        self.stage() == Stage::Slide && self.hidden.binary_search(&pos).is_ok()
    }

    /// Travelling tiles for this frame. Empty outside the slide stage.
    pub fn sprites(&self) -> Vec<Sprite> {
        if self.stage() != Stage::Slide {
            return Vec::new();
        }
        let t = (self.tick + 1) as f32 / self.slide_ticks as f32;
        self.travels
            .iter()
            .map(|tr| Sprite {
                row: lerp(tr.from.row, tr.to.row, t),
                col: lerp(tr.from.col, tr.to.col, t),
                value: tr.value,
            })
            .collect()
    }

    /// Extra cells of padding around the tile at `pos` (grow phase of a pop).
    pub fn pop_pad(&self, pos: Position) -> usize {
        if self.stage() != Stage::Pop || !self.pops.contains(&pos) {
            return 0;
        }
        let t = self.tick - self.slide_len();
        if t * 2 < self.pop_ticks { 1 } else { 0 }
    }
}

fn lerp(a: usize, b: usize, t: f32) -> f32 {
    a as f32 + (b as f32 - a as f32) * t.clamp(0.0, 1.0)
}
