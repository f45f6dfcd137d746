/// Row-reduce-left: the one primitive every move is built from.
///
/// Three passes over a single line, leading edge at index 0:
///   1. compress: pack tiles toward index 0, keeping their order
///   2. merge: scan adjacent pairs left to right; an equal pair becomes
///      one tile of the sum in the left slot, the right slot empties
///   3. compress: close the gaps the merges left behind
///
/// A merged slot is never compared again in the same scan: the scan has
/// already moved past it and its right neighbour is now empty. That gives the
/// single-merge-per-tile rule (`[2,2,2,2]` → `[4,4,0,0]`, never `[8,0,0,0]`).
///
/// Each slot remembers which input index its tile came from, so the caller
/// gets a per-tile account of the move for animation.

use super::tile::{can_merge, is_occupied, Value, EMPTY};

/// One tile's journey within a line, in line indices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Slide {
    pub from: usize,
    pub to: usize,
    /// Value the destination holds after the move.
    pub value: Value,
    /// True for both sources of a merge.
    pub merged: bool,
}

/// Outcome of reducing one line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineReport {
    /// Tiles that moved or merged. Stationary, unmerged tiles are omitted.
    pub slides: Vec<Slide>,
    /// Sum of the values produced by merges.
    pub gain: Value,
}

impl LineReport {
    pub fn changed(&self) -> bool {
        !self.slides.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    value: Value,
    origin: Option<usize>,
    absorbed: Option<usize>,
}

impl Slot {
    const EMPTY: Slot = Slot { value: EMPTY, origin: None, absorbed: None };
}

/// Reduce `line` toward index 0 in place.
pub fn reduce_left<const N: usize>(line: &mut [Value; N]) -> LineReport {
    let mut slots = [Slot::EMPTY; N];
    for (i, &value) in line.iter().enumerate() {
        if is_occupied(value) {
            slots[i] = Slot { value, origin: Some(i), absorbed: None };
        }
    }

    compress(&mut slots);
    let gain = merge(&mut slots);
    compress(&mut slots);

    let mut slides = Vec::new();
    for (to, slot) in slots.iter().enumerate() {
        line[to] = slot.value;
        let Some(from) = slot.origin else { continue };
        match slot.absorbed {
            Some(other) => {
                slides.push(Slide { from, to, value: slot.value, merged: true });
                slides.push(Slide { from: other, to, value: slot.value, merged: true });
            }
            None if from != to => {
                slides.push(Slide { from, to, value: slot.value, merged: false });
            }
            None => {}
        }
    }

    LineReport { slides, gain }
}

fn compress<const N: usize>(slots: &mut [Slot; N]) {
    let mut write = 0;
    for read in 0..N {
        if is_occupied(slots[read].value) {
            if write != read {
                slots[write] = slots[read];
                slots[read] = Slot::EMPTY;
            }
            write += 1;
        }
    }
}

fn merge<const N: usize>(slots: &mut [Slot; N]) -> Value {
    let mut gain = 0;
    for j in 0..N.saturating_sub(1) {
        if can_merge(slots[j].value, slots[j + 1].value) {
            slots[j].value += slots[j + 1].value;
            slots[j].absorbed = slots[j + 1].origin;
            slots[j + 1] = Slot::EMPTY;
            gain += slots[j].value;
        }
    }
    gain
}
