/// Move directions and the line framing shared by moves and legality checks.
///
/// Every direction is treated as "left" in its own frame. A frame line is a
/// row (Left/Right) or a column (Up/Down), indexed from the edge the tiles
/// travel toward:
///
/// ┌───────────┬──────────────────────┬────────────────────────────┐
/// │ Direction │ Reframe              │ (line, i) → board position │
/// ├───────────┼──────────────────────┼────────────────────────────┤
/// │ Left      │ none                 │ (line, i)                  │
/// │ Right     │ flip                 │ (line, N-1-i)              │
/// │ Up        │ transpose            │ (i, line)                  │
/// │ Down      │ transpose, flip      │ (N-1-i, line)              │
/// └───────────┴──────────────────────┴────────────────────────────┘

use std::fmt;

use super::tile::Position;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Board position of the `i`-th cell (counted from the leading edge)
    /// of frame line `line` on an `n`×`n` grid.
    #[inline]
    pub fn frame_position(self, line: usize, i: usize, n: usize) -> Position {
        match self {
            Direction::Left => Position::new(line, i),
            Direction::Right => Position::new(line, n - 1 - i),
            Direction::Up => Position::new(i, line),
            Direction::Down => Position::new(n - 1 - i, line),
        }
    }

    /// Does this direction's frame need a transpose?
    pub fn transposed(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Does this direction's frame need a horizontal flip (after any transpose)?
    pub fn flipped(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_edge_per_direction() {
        // i = 0 is the edge the tiles slide toward
        assert_eq!(Direction::Left.frame_position(2, 0, 4), Position::new(2, 0));
        assert_eq!(Direction::Right.frame_position(2, 0, 4), Position::new(2, 3));
        assert_eq!(Direction::Up.frame_position(2, 0, 4), Position::new(0, 2));
        assert_eq!(Direction::Down.frame_position(2, 0, 4), Position::new(3, 2));
    }

    #[test]
    fn frame_covers_every_cell_once() {
        for dir in Direction::ALL {
            let mut seen = [[false; 4]; 4];
            for line in 0..4 {
                for i in 0..4 {
                    let p = dir.frame_position(line, i, 4);
                    assert!(!seen[p.row][p.col], "{dir} hits {p:?} twice");
                    seen[p.row][p.col] = true;
                }
            }
        }
    }

    #[test]
    fn reframe_flags() {
        assert!(!Direction::Left.transposed() && !Direction::Left.flipped());
        assert!(!Direction::Right.transposed() && Direction::Right.flipped());
        assert!(Direction::Up.transposed() && !Direction::Up.flipped());
        assert!(Direction::Down.transposed() && Direction::Down.flipped());
    }
}
