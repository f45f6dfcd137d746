/// Tile values and grid coordinates.
/// A cell is a bare `u32`: 0 means empty, anything else is a power of two.
/// Value semantics are queried through the helpers here so the rules
/// live in one place.

pub type Value = u32;

/// The empty cell.
pub const EMPTY: Value = 0;

/// Upper bound (inclusive) of the spawn draw.
pub const SPAWN_DRAW_MAX: u32 = 100;

/// A draw at or above this yields a 4, anything lower a 2.
pub const SPAWN_FOUR_THRESHOLD: u32 = 90;

/// (row, col) address on the grid. Row 0 is the top edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

/// Does this cell hold a tile?
#[inline]
pub fn is_occupied(value: Value) -> bool {
    value != EMPTY
}

/// Is this a value a tile may legally carry?
pub fn is_tile_value(value: Value) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// Is this a value any cell may carry (tile or empty)?
pub fn is_cell_value(value: Value) -> bool {
    value == EMPTY || is_tile_value(value)
}

/// Map a uniform draw over `1..=100` to the spawned value.
pub fn spawn_value(draw: u32) -> Value {
    if draw >= SPAWN_FOUR_THRESHOLD { 4 } else { 2 }
}

/// Can these two cells combine into one? Both must hold a tile.
#[inline]
pub fn can_merge(a: Value, b: Value) -> bool {
    a != EMPTY && a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_values_are_powers_of_two() {
        for v in [2, 4, 8, 1024, 2048, 1 << 17] {
            assert!(is_tile_value(v), "{v}");
        }
        for v in [0, 1, 3, 6, 12, 2047] {
            assert!(!is_tile_value(v), "{v}");
        }
        assert!(is_cell_value(EMPTY));
    }

    #[test]
    fn spawn_threshold() {
        assert_eq!(spawn_value(1), 2);
        assert_eq!(spawn_value(89), 2);
        assert_eq!(spawn_value(90), 4);
        assert_eq!(spawn_value(100), 4);
    }

    #[test]
    fn merge_requires_two_tiles() {
        assert!(can_merge(2, 2));
        assert!(!can_merge(0, 0));
        assert!(!can_merge(2, 4));
        assert!(!can_merge(0, 2));
        assert!(!can_merge(2, 0));
    }
}
