//! Saturation-capped complexity histogram.
//!
//! Cells are indexed by c1 (rows) and, when the c2 axis is bounded, by c2
//! (columns). Without a c2 axis the table is one-dimensional over c1.

use std::ops::RangeInclusive;

/// Where a `(c1, c2)` measurement lands in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinStatus {
    /// Inside the declared ranges and below capacity.
    Open,
    Full,
    OutOfRange,
}

#[derive(Debug, Clone)]
pub struct ComplexityBins {
    c1: RangeInclusive<u32>,
    c2: Option<RangeInclusive<u32>>,
    capacity: u32,
    counts: Vec<u32>,
}

impl ComplexityBins {
    pub fn new(c1: RangeInclusive<u32>, c2: Option<RangeInclusive<u32>>, capacity: u32) -> Self {
        let columns = c2.as_ref().map_or(1, axis_len);
        let cells = axis_len(&c1) * columns;
        Self {
            c1,
            c2,
            capacity,
            counts: vec![0; cells],
        }
    }

    fn slot(&self, c1: u32, c2: u32) -> Option<usize> {
        if !self.c1.contains(&c1) {
            return None;
        }
        let row = (c1 - self.c1.start()) as usize;
        match &self.c2 {
            None => Some(row),
            Some(axis) if axis.contains(&c2) => {
                Some(row * axis_len(axis) + (c2 - axis.start()) as usize)
            }
            Some(_) => None,
        }
    }

    pub fn status(&self, c1: u32, c2: u32) -> BinStatus {
        match self.slot(c1, c2) {
            None => BinStatus::OutOfRange,
            Some(slot) if self.counts[slot] >= self.capacity => BinStatus::Full,
            Some(_) => BinStatus::Open,
        }
    }

    /// Current fill of a cell (0 when out of range).
    pub fn count(&self, c1: u32, c2: u32) -> u32 {
        self.slot(c1, c2).map_or(0, |slot| self.counts[slot])
    }

    /// Records one accepted instance and returns the cell's new fill.
    ///
    /// Returns `None`, leaving the table untouched, if the cell is full or out of range.
    pub fn increment(&mut self, c1: u32, c2: u32) -> Option<u32> {
        let slot = self.slot(c1, c2)?;
        if self.counts[slot] >= self.capacity {
            return None;
        }
        self.counts[slot] += 1;
        Some(self.counts[slot])
    }

    /// Whether every cell of row `c1` is saturated.
    pub fn row_full(&self, c1: u32) -> bool {
        let Some(start) = self.slot(c1, self.c2.as_ref().map_or(0, |axis| *axis.start())) else {
            return true;
        };
        let columns = self.c2.as_ref().map_or(1, axis_len);
        self.counts[start..start + columns]
            .iter()
            .all(|&count| count >= self.capacity)
    }

    pub fn all_full(&self) -> bool {
        self.counts.iter().all(|&count| count >= self.capacity)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&count| u64::from(count)).sum()
    }
}

fn axis_len(axis: &RangeInclusive<u32>) -> usize {
    if axis.is_empty() {
        0
    } else {
        (axis.end() - axis.start()) as usize + 1
    }
}
