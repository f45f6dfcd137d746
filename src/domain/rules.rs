/// Legality and terminal-state rules.
///
/// Pure functions over a grid. They read cells through
/// `Direction::frame_position` and never reframe or mutate anything, so all
/// four directions are checked against the same untouched state.
///
/// ## Legality Truth Table
///
/// For a direction, walk every frame line from the leading edge. A pair is
/// (far = cell i-1, near = cell i); the near tile would travel onto far.
/// ┌──────────────────────────────┬───────────┐
/// │ Condition on (far, near)      │ Legal?    │
/// ├──────────────────────────────┼───────────┤
/// │ near empty                    │ no        │
/// │ near tile, far empty          │ YES slide │
/// │ near tile, far equal tile     │ YES merge │
/// │ near tile, far different tile │ no        │
/// └──────────────────────────────┴───────────┘
/// A direction is legal if ANY pair in ANY line says yes.
///
/// ## Terminal States
/// ┌──────────────────────────────┬───────────┐
/// │ Condition                     │ State     │
/// ├──────────────────────────────┼───────────┤
/// │ some cell >= target           │ Won       │
/// │ full AND no legal direction   │ Lost      │
/// └──────────────────────────────┴───────────┘

use super::direction::Direction;
use super::tile::{is_occupied, Value, EMPTY};

#[inline]
fn at<const N: usize>(cells: &[[Value; N]; N], direction: Direction, line: usize, i: usize) -> Value {
    let p = direction.frame_position(line, i, N);
    cells[p.row][p.col]
}

/// Would a move in `direction` change anything?
pub fn can_move<const N: usize>(cells: &[[Value; N]; N], direction: Direction) -> bool {
    (0..N).any(|line| {
        (1..N).any(|i| {
            let near = at(cells, direction, line, i);
            let far = at(cells, direction, line, i - 1);
            is_occupied(near) && (far == EMPTY || far == near)
        })
    })
}

/// Is any of the four directions legal?
pub fn has_legal_move<const N: usize>(cells: &[[Value; N]; N]) -> bool {
    Direction::ALL.iter().any(|&d| can_move(cells, d))
}

pub fn is_full<const N: usize>(cells: &[[Value; N]; N]) -> bool {
    cells.iter().flatten().all(|&v| is_occupied(v))
}

pub fn is_won<const N: usize>(cells: &[[Value; N]; N], target: Value) -> bool {
    cells.iter().flatten().any(|&v| v >= target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal<const N: usize>(cells: &[[Value; N]; N]) -> [bool; 4] {
        Direction::ALL.map(|d| can_move(cells, d))
    }

    fn is_lost<const N: usize>(cells: &[[Value; N]; N]) -> bool {
        is_full(cells) && !has_legal_move(cells)
    }

    // ── Per-direction legality ──

    #[test]
    fn empty_board_has_no_move() {
        let g = [[0; 4]; 4];
        assert_eq!(legal(&g), [false; 4]);
        assert!(!has_legal_move(&g));
        assert!(!is_lost(&g)); // not full
    }

    #[test]
    fn single_tile_in_corner() {
        // top-left: only Right and Down can move it
        let g = [[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]];
        // order: Left, Right, Up, Down
        assert_eq!(legal(&g), [false, true, false, true]);
    }

    #[test]
    fn single_tile_in_middle() {
        let g = [[0; 4], [0, 2, 0, 0], [0; 4], [0; 4]];
        assert_eq!(legal(&g), [true; 4]);
    }

    #[test]
    fn packed_row_with_pair_merges_both_ways() {
        let g = [[2, 2, 4, 8], [0; 4], [0; 4], [0; 4]];
        let l = legal(&g);
        assert!(l[0] && l[1]); // merge left or right
        assert!(!l[2]); // already at the top
        assert!(l[3]);
    }

    #[test]
    fn distinct_packed_row_blocks_horizontal() {
        let g = [[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]];
        assert_eq!(legal(&g), [false, false, false, true]);
    }

    #[test]
    fn vertical_pair_only() {
        let g = [[2, 4, 8, 16], [2, 8, 16, 32], [4, 16, 32, 64], [8, 32, 64, 128]];
        assert_eq!(legal(&g), [false, false, true, true]);
        assert!(!is_lost(&g));
    }

    #[test]
    fn empty_pairs_are_not_merges() {
        // two empties side by side must not count as an equal pair
        let g = [[2, 4, 0, 0], [4, 2, 0, 0], [2, 4, 0, 0], [4, 2, 0, 0]];
        assert_eq!(legal(&g), [false, true, false, false]);
    }

    // ── Terminal detection ──

    #[test]
    fn checkerboard_2x2_is_lost() {
        let g = [[2, 4], [4, 2]];
        assert!(!has_legal_move(&g));
        assert!(is_full(&g));
        assert!(is_lost(&g));
    }

    #[test]
    fn checkerboard_4x4_is_lost() {
        let g = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        assert_eq!(legal(&g), [false; 4]);
        assert!(is_lost(&g));
    }

    #[test]
    fn full_board_with_pair_is_not_lost() {
        let g = [[2, 2], [4, 8]];
        assert!(is_full(&g));
        assert!(has_legal_move(&g));
        assert!(!is_lost(&g));
    }

    #[test]
    fn won_at_or_above_target() {
        let g = [[2048, 0], [0, 0]];
        assert!(is_won(&g, 2048));
        assert!(is_won(&[[0, 4096], [0, 0]], 2048));
        assert!(!is_won(&[[1024, 1024], [0, 0]], 2048));
    }

    #[test]
    fn checks_do_not_mutate() {
        let g = [[2, 0, 4, 4], [0, 8, 0, 8], [16, 0, 0, 0], [0, 0, 0, 2]];
        let copy = g;
        let _ = has_legal_move(&g);
        let _ = legal(&g);
        assert_eq!(g, copy);
    }
}
