/// The board engine: an N×N grid of tile values plus the four moves.
///
/// Moves never touch `cells` until the new grid is complete. The grid is
/// copied, reframed so the requested direction becomes "left", reduced row by
/// row with `line::reduce_left`, reframed back, and only then stored. Slides
/// are mapped back to board positions through `Direction::frame_position`.
///
/// Legality, win and loss queries live in `rules` and read the grid through
/// index mapping only.

use std::fmt;

use rand::Rng;

use super::direction::Direction;
use super::line;
use super::rules;
use super::tile::{self, is_occupied, Position, Value, EMPTY, SPAWN_DRAW_MAX};

/// Grid edge length used by the game.
pub const GRID_SIZE: usize = 4;

pub type Grid<const N: usize> = [[Value; N]; N];

/// A tile that moved or merged during one move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileMove {
    pub from: Position,
    pub to: Position,
    /// Value held at `to` once the move completes.
    pub value: Value,
    /// Set on both sources of a merge.
    pub merged: bool,
}

impl TileMove {
    /// Value the tile carried before the move.
    pub fn source_value(&self) -> Value {
        if self.merged { self.value / 2 } else { self.value }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawn {
    pub at: Position,
    pub value: Value,
}

/// Everything the presentation layer needs to animate one move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResult {
    pub direction: Direction,
    pub changed: bool,
    pub moves: Vec<TileMove>,
    /// Sum of the values produced by merges.
    pub gain: Value,
    pub spawned: Option<Spawn>,
}

impl MoveResult {
    fn unchanged(direction: Direction) -> Self {
        MoveResult {
            direction,
            changed: false,
            moves: Vec::new(),
            gain: 0,
            spawned: None,
        }
    }

    /// Destinations of merges, one entry per merge.
    pub fn merges(&self) -> impl Iterator<Item = (Position, Value)> + '_ {
        // Both sources are reported; keep the first one per destination.
        self.moves
            .iter()
            .enumerate()
            .filter(|(i, m)| m.merged && !self.moves[..*i].iter().any(|p| p.merged && p.to == m.to))
            .map(|(_, m)| (m.to, m.value))
    }

    pub fn merge_count(&self) -> usize {
        self.moves.iter().filter(|m| m.merged).count() / 2
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Board<const N: usize = GRID_SIZE> {
    cells: Grid<N>,
}

impl<const N: usize> Board<N> {
    const VALID_SIZE: () = assert!(N >= 2 && N % 2 == 0, "grid size must be even and at least 2");

    /// An empty board.
    pub fn new() -> Self {
        let () = Self::VALID_SIZE;
        Board { cells: [[EMPTY; N]; N] }
    }

    /// An empty board seeded with its two opening tiles.
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> (Self, [Option<Spawn>; 2]) {
        let mut board = Self::new();
        let first = board.spawn_tile(rng);
        let second = board.spawn_tile(rng);
        (board, [first, second])
    }

    /// Build a board from literal rows.
    #[cfg(test)]
    pub fn from_rows(cells: Grid<N>) -> Self {
        let () = Self::VALID_SIZE;
        assert!(
            cells.iter().flatten().all(|&v| tile::is_cell_value(v)),
            "not a valid board: {cells:?}"
        );
        Board { cells }
    }

    pub fn rows(&self) -> &Grid<N> {
        &self.cells
    }

    pub fn get(&self, pos: Position) -> Value {
        self.cells[pos.row][pos.col]
    }

    /// Sum of all tile values. Recomputed on every call.
    pub fn score(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| is_occupied(v)).count()
    }

    pub fn max_tile(&self) -> Value {
        self.cells.iter().flatten().copied().max().unwrap_or(EMPTY)
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        let mut empty = Vec::with_capacity(N * N);
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, &v) in cells.iter().enumerate() {
                if !is_occupied(v) {
                    empty.push(Position::new(row, col));
                }
            }
        }
        empty
    }

    pub fn is_full(&self) -> bool {
        rules::is_full(&self.cells)
    }

    pub fn can_move(&self, direction: Direction) -> bool {
        rules::can_move(&self.cells, direction)
    }

    pub fn has_legal_move(&self) -> bool {
        rules::has_legal_move(&self.cells)
    }

    pub fn is_won(&self, target: Value) -> bool {
        rules::is_won(&self.cells, target)
    }

    pub fn is_lost(&self) -> bool {
        self.is_full() && !self.has_legal_move()
    }

    /// Apply a move. A move with no effect leaves the board untouched and
    /// spawns nothing; a changing move is followed by one spawn.
    pub fn try_move<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> MoveResult {
        if !self.can_move(direction) {
            return MoveResult::unchanged(direction);
        }
        let mut result = self.shift(direction);
        if result.changed {
            result.spawned = self.spawn_tile(rng);
        }
        result
    }

    /// Place a 2 or a 4 on a uniformly chosen empty cell.
    /// Returns `None` on a full board.
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Spawn> {
        let empty = self.empty_positions();
        if empty.is_empty() {
            return None;
        }
        let at = empty[rng.gen_range(0..empty.len())];
        let value = tile::spawn_value(rng.gen_range(1..=SPAWN_DRAW_MAX));
        self.cells[at.row][at.col] = value;
        Some(Spawn { at, value })
    }

    /// Slide and merge without spawning.
    fn shift(&mut self, direction: Direction) -> MoveResult {
        let mut work = self.cells;
        reframe(&mut work, direction);

        let mut moves = Vec::new();
        let mut gain = 0;
        let mut changed = false;
        for (line_idx, row) in work.iter_mut().enumerate() {
            let report = line::reduce_left(row);
            changed |= report.changed();
            gain += report.gain;
            moves.extend(report.slides.iter().map(|s| TileMove {
                from: direction.frame_position(line_idx, s.from, N),
                to: direction.frame_position(line_idx, s.to, N),
                value: s.value,
                merged: s.merged,
            }));
        }

        unframe(&mut work, direction);
        self.cells = work;

        MoveResult {
            direction,
            changed,
            moves,
            gain,
            spawned: None,
        }
    }
}

impl<const N: usize> Default for Board<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Reframing (working copies only) ──

fn flip<const N: usize>(grid: &mut Grid<N>) {
    for row in grid.iter_mut() {
        row.reverse();
    }
}

fn transpose<const N: usize>(grid: &mut Grid<N>) {
    for i in 1..N {
        for j in 0..i {
            let tmp = grid[i][j];
            grid[i][j] = grid[j][i];
            grid[j][i] = tmp;
        }
    }
}

fn reframe<const N: usize>(grid: &mut Grid<N>, direction: Direction) {
    if direction.transposed() {
        transpose(grid);
    }
    if direction.flipped() {
        flip(grid);
    }
}

fn unframe<const N: usize>(grid: &mut Grid<N>, direction: Direction) {
    if direction.flipped() {
        flip(grid);
    }
    if direction.transposed() {
        transpose(grid);
    }
}

impl<const N: usize> fmt::Display for Board<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for &v in row {
                if v == EMPTY {
                    write!(f, "     .")?;
                } else {
                    write!(f, "{v:6}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn sorted_tiles<const N: usize>(b: &Board<N>) -> Vec<Value> {
        let mut v: Vec<Value> = b.rows().iter().flatten().copied().filter(|&v| v != 0).collect();
        v.sort_unstable();
        v
    }

    fn shifted(rows: Grid<4>, dir: Direction) -> (Grid<4>, MoveResult) {
        let mut b = Board::from_rows(rows);
        let r = b.shift(dir);
        (*b.rows(), r)
    }

    // ── Reframing ──

    #[test]
    fn flip_and_transpose_are_involutions() {
        let g = [[2, 4, 8, 16], [32, 64, 128, 256], [0, 2, 0, 4], [8, 0, 0, 2]];
        let mut a = g;
        flip(&mut a);
        assert_eq!(a[0], [16, 8, 4, 2]);
        flip(&mut a);
        assert_eq!(a, g);
        transpose(&mut a);
        assert_eq!(a[0], [2, 32, 0, 8]);
        transpose(&mut a);
        assert_eq!(a, g);
        for dir in Direction::ALL {
            let mut b = g;
            reframe(&mut b, dir);
            unframe(&mut b, dir);
            assert_eq!(b, g, "{dir}");
        }
    }

    // ── Directional moves ──

    const MIXED: Grid<4> = [[2, 2, 0, 0], [0, 4, 4, 0], [2, 0, 2, 0], [8, 8, 8, 8]];
    const COLUMNS: Grid<4> = [[2, 0, 2, 8], [2, 4, 0, 8], [0, 4, 2, 8], [0, 0, 0, 8]];

    #[test]
    fn move_left() {
        let (g, r) = shifted(MIXED, Direction::Left);
        assert_eq!(g, [[4, 0, 0, 0], [8, 0, 0, 0], [4, 0, 0, 0], [16, 16, 0, 0]]);
        assert_eq!(r.gain, 4 + 8 + 4 + 32);
    }

    #[test]
    fn move_right() {
        let (g, r) = shifted(MIXED, Direction::Right);
        assert_eq!(g, [[0, 0, 0, 4], [0, 0, 0, 8], [0, 0, 0, 4], [0, 0, 16, 16]]);
        assert_eq!(r.gain, 4 + 8 + 4 + 32);
    }

    #[test]
    fn move_up() {
        let (g, r) = shifted(COLUMNS, Direction::Up);
        assert_eq!(g, [[4, 8, 4, 16], [0, 0, 0, 16], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(r.gain, 4 + 8 + 4 + 32);
    }

    #[test]
    fn move_down() {
        let (g, r) = shifted(COLUMNS, Direction::Down);
        assert_eq!(g, [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 16], [4, 8, 4, 16]]);
        assert_eq!(r.gain, 4 + 8 + 4 + 32);
    }

    #[test]
    fn right_merges_from_the_right_edge() {
        // [2,2,2,0] right → [0,0,2,4]: the pair nearest the edge merges
        let (g, _) = shifted([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]], Direction::Right);
        assert_eq!(g[0], [0, 0, 2, 4]);
        let (g, _) = shifted([[2, 0, 0, 0], [2, 0, 0, 0], [2, 0, 0, 0], [0; 4]], Direction::Down);
        assert_eq!([g[0][0], g[1][0], g[2][0], g[3][0]], [0, 0, 2, 4]);
    }

    #[test]
    fn moves_map_back_to_board_positions() {
        let (_, r) = shifted([[0; 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 2, 0, 2]], Direction::Up);
        assert_eq!(
            r.moves,
            vec![
                TileMove { from: Position::new(3, 1), to: Position::new(0, 1), value: 2, merged: false },
                TileMove { from: Position::new(3, 3), to: Position::new(0, 3), value: 2, merged: false },
            ]
        );

        let (_, r) = shifted([[0; 4], [4, 0, 4, 0], [0; 4], [0; 4]], Direction::Right);
        assert_eq!(r.merge_count(), 1);
        assert!(r.moves.iter().all(|m| m.merged && m.to == Position::new(1, 3) && m.value == 8));
        let froms: HashSet<_> = r.moves.iter().map(|m| m.from).collect();
        assert_eq!(froms, HashSet::from([Position::new(1, 2), Position::new(1, 0)]));
        assert_eq!(r.merges().collect::<Vec<_>>(), vec![(Position::new(1, 3), 8)]);
    }

    // ── try_move ──

    #[test]
    fn blocked_move_is_a_no_op() {
        let rows = [[2, 0, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0], [16, 0, 0, 0]];
        let mut b = Board::from_rows(rows);
        let r = b.try_move(Direction::Left, &mut rng(0));
        assert!(!r.changed);
        assert!(r.moves.is_empty());
        assert_eq!(r.spawned, None);
        assert_eq!(*b.rows(), rows);
    }

    #[test]
    fn changing_move_spawns_once() {
        let mut b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let r = b.try_move(Direction::Right, &mut rng(3));
        assert!(r.changed);
        let spawn = r.spawned.expect("spawn after a changing move");
        assert_eq!(b.get(spawn.at), spawn.value);
        assert_eq!(b.tile_count(), 2);
        assert_eq!(b.get(Position::new(0, 3)), 2);
    }

    #[test]
    fn no_op_holds_for_every_blocked_direction() {
        let mut r = rng(11);
        for seed in 0..200 {
            let mut game_rng = rng(seed);
            let (mut b, _) = Board::<4>::new_game(&mut game_rng);
            for _ in 0..(seed % 40) {
                let dir = Direction::ALL[r.gen_range(0..4)];
                b.try_move(dir, &mut game_rng);
            }
            for dir in Direction::ALL {
                if !b.can_move(dir) {
                    let before = b;
                    let res = b.try_move(dir, &mut game_rng);
                    assert!(!res.changed);
                    assert_eq!(b, before);
                }
            }
        }
    }

    #[test]
    fn legality_agrees_with_shift() {
        let mut r = rng(5);
        for seed in 0..300 {
            let mut game_rng = rng(seed);
            let (mut b, _) = Board::<4>::new_game(&mut game_rng);
            for _ in 0..(seed % 60) {
                b.try_move(Direction::ALL[r.gen_range(0..4)], &mut game_rng);
            }
            for dir in Direction::ALL {
                let mut copy = b;
                assert_eq!(copy.shift(dir).changed, b.can_move(dir), "{dir}\n{b}");
            }
        }
    }

    // ── Invariants over random play ──

    #[test]
    fn random_play_keeps_invariants() {
        let mut game_rng = rng(2048);
        let mut pick = rng(7);
        let (mut b, _) = Board::<4>::new_game(&mut game_rng);
        for _ in 0..2000 {
            if b.is_lost() {
                b = Board::new_game(&mut game_rng).0;
            }
            let before = b;
            let dir = Direction::ALL[pick.gen_range(0..4)];
            let res = b.try_move(dir, &mut game_rng);

            assert!(b.rows().iter().flatten().all(|&v| tile::is_cell_value(v)));
            assert!(b.tile_count() <= 16);

            if !res.changed {
                assert_eq!(b, before);
                continue;
            }
            let spawn = res.spawned.expect("room for a spawn after a changing move");
            let spawned = spawn.value;

            // sum invariant: merges conserve the sum, the spawn adds to it
            assert_eq!(b.score(), before.score() + spawned);
            // each merge removes exactly one tile
            assert_eq!(b.tile_count() + res.merge_count(), before.tile_count() + 1);

            // single merge per tile: no source position appears twice
            let mut froms = HashSet::new();
            assert!(res.moves.iter().all(|m| froms.insert(m.from)));
            // a merge destination gets exactly two sources
            for (at, _) in res.merges() {
                assert_eq!(res.moves.iter().filter(|m| m.merged && m.to == at).count(), 2);
            }
        }
    }

    #[test]
    fn no_merge_move_preserves_multiset() {
        let rows = [[0, 2, 0, 4], [8, 0, 16, 0], [0, 0, 0, 32], [2, 4, 2, 4]];
        let mut b = Board::from_rows(rows);
        let before = sorted_tiles(&b);
        let res = b.shift(Direction::Left);
        assert!(res.changed);
        assert_eq!(res.merge_count(), 0);
        assert_eq!(sorted_tiles(&b), before);
    }

    // ── Spawning ──

    #[test]
    fn spawn_on_full_board_is_none() {
        let mut b = Board::from_rows([[2, 4], [4, 2]]);
        assert_eq!(b.spawn_tile(&mut rng(1)), None);
        assert_eq!(*b.rows(), [[2, 4], [4, 2]]);
    }

    #[test]
    fn spawn_fills_the_only_gap() {
        let mut b = Board::from_rows([[2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 0, 64], [16, 32, 64, 128]]);
        let s = b.spawn_tile(&mut rng(9)).expect("one empty cell");
        assert_eq!(s.at, Position::new(2, 2));
        assert!(b.is_full());
    }

    #[test]
    fn spawn_distribution() {
        let mut r = rng(42);
        let trials = 20_000;
        let mut fours = 0;
        for _ in 0..trials {
            let mut b = Board::<4>::new();
            let s = b.spawn_tile(&mut r).expect("empty board");
            assert!(s.value == 2 || s.value == 4);
            if s.value == 4 {
                fours += 1;
            }
        }
        // draws 90..=100 out of 1..=100
        let rate = fours as f64 / trials as f64;
        assert!((rate - 0.11).abs() < 0.015, "four rate {rate}");
    }

    #[test]
    fn spawn_position_is_uniform() {
        let mut r = rng(8);
        let mut counts = [[0u32; 4]; 4];
        for _ in 0..16_000 {
            let mut b = Board::<4>::new();
            let s = b.spawn_tile(&mut r).expect("empty board");
            counts[s.at.row][s.at.col] += 1;
        }
        for c in counts.iter().flatten() {
            assert!((800..1200).contains(c), "{counts:?}");
        }
    }

    #[test]
    fn new_game_has_two_tiles() {
        let (b, spawns) = Board::<4>::new_game(&mut rng(77));
        assert_eq!(b.tile_count(), 2);
        assert!(spawns.iter().all(|s| s.is_some()));
        assert_ne!(spawns[0].map(|s| s.at), spawns[1].map(|s| s.at));
    }

    #[test]
    fn same_seed_same_game() {
        let (a, _) = Board::<4>::new_game(&mut rng(123));
        let (b, _) = Board::<4>::new_game(&mut rng(123));
        assert_eq!(a, b);
    }

    // ── Derived values ──

    #[test]
    fn score_is_sum_of_tiles() {
        let b = Board::from_rows([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 8, 0], [0, 0, 0, 2048]]);
        assert_eq!(b.score(), 2062);
        assert_eq!(b.max_tile(), 2048);
        assert!(b.is_won(2048));
        assert!(!b.is_won(4096));
    }

    #[test]
    fn display_marks_empty_cells() {
        let b = Board::from_rows([[2, 0], [0, 1024]]);
        let s = b.to_string();
        assert_eq!(s.lines().count(), 2);
        assert!(s.contains('.'));
        assert!(s.contains("1024"));
    }
}
