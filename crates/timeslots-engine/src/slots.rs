//! Slice open periods into fixed-width bookable slots.

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Slot width and alignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotGrid {
    /// Slot width in minutes. Must be positive.
    pub granularity: u32,
    /// Start slots on multiples of `granularity` counted from 00:00.
    pub midnight_alignment: bool,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            granularity: 30,
            midnight_alignment: false,
        }
    }
}

/// Slice every period into `grid.granularity`-wide slots, concatenated in
/// period order.
///
/// A slot is emitted only if it fits entirely inside its period; a shorter
/// remainder at the end of a period is dropped. A zero granularity yields no
/// slots.
pub fn slice(periods: &[Interval], grid: SlotGrid) -> Vec<Interval> {
    let Ok(width) = i32::try_from(grid.granularity) else {
        return Vec::new();
    };
    if width == 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for period in periods {
        let mut begin = period.begin;
        if grid.midnight_alignment && begin.rem_euclid(width) != 0 {
            match (begin.div_euclid(width) + 1).checked_mul(width) {
                Some(aligned) => begin = aligned,
                None => continue,
            }
        }
        while let Some(end) = begin.checked_add(width).filter(|&end| end <= period.end) {
            slots.push(Interval { begin, end });
            begin = end;
        }
    }
    slots
}
