//! Joint occurrence counts of adjacent bit pairs.

use crate::bits::BitFloat;
use serde::{Deserialize, Serialize};

/// Per bit position, a 2×2 table counting `(bit[t], bit[t+1])` pairs.
///
/// `table(b)[i][j]` is the number of adjacent pairs whose first element has
/// bit `b` equal to `i` and whose second element has bit `b` equal to `j`.
/// Merging is associative and commutative, so counts from disjoint chunks
/// of data can be accumulated independently and combined in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitPairCounts {
    width: u32,
    tables: Vec<[[u64; 2]; 2]>,
    n_pairs: u64,
}

impl BitPairCounts {
    /// Empty counts for a format of the given bit width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            tables: vec![[[0; 2]; 2]; width as usize],
            n_pairs: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of pairs counted.
    #[inline]
    pub fn n_pairs(&self) -> u64 {
        self.n_pairs
    }

    /// Joint table for bit `bit` (0 = sign bit).
    #[inline]
    pub fn table(&self, bit: usize) -> [[u64; 2]; 2] {
        self.tables[bit]
    }

    /// Count one adjacent pair of raw bit patterns.
    #[inline]
    pub fn add(&mut self, prev: u64, next: u64) {
        let last = self.width as usize - 1;
        for (bit, table) in self.tables.iter_mut().enumerate() {
            let shift = last - bit;
            let i = ((prev >> shift) & 1) as usize;
            let j = ((next >> shift) & 1) as usize;
            table[i][j] += 1;
        }
        self.n_pairs += 1;
    }

    /// Count every adjacent pair of a sequence, skipping pairs where either
    /// element is NaN or equal to `masked_value`.
    ///
    /// The mask is narrowed to the element type before comparing, so a fill
    /// value like -999.9 matches the nearest `f32` the data actually holds.
    pub fn add_sequence<'a, T, I>(&mut self, values: I, masked_value: Option<f64>)
    where
        T: BitFloat,
        I: IntoIterator<Item = &'a T>,
    {
        let mask = masked_value.map(T::from_f64);
        let excluded = |x: T| x.is_nan() || mask.map_or(false, |m| x == m);
        let mut prev: Option<T> = None;
        for &x in values {
            if let Some(p) = prev {
                if !excluded(p) && !excluded(x) {
                    self.add(p.to_raw(), x.to_raw());
                }
            }
            prev = Some(x);
        }
    }

    /// Combine counts from another chunk of the same format.
    pub fn merge(mut self, other: &Self) -> Self {
        debug_assert_eq!(self.width, other.width);
        for (mine, theirs) in self.tables.iter_mut().zip(&other.tables) {
            for i in 0..2 {
                for j in 0..2 {
                    mine[i][j] += theirs[i][j];
                }
            }
        }
        self.n_pairs += other.n_pairs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_counts_every_bit() {
        let mut c = BitPairCounts::new(32);
        c.add(1.0f32.to_raw(), (-1.0f32).to_raw());
        assert_eq!(c.n_pairs(), 1);
        // Sign flips 0 -> 1
        assert_eq!(c.table(0), [[0, 1], [0, 0]]);
        // Second exponent bit is set in both
        assert_eq!(c.table(2), [[0, 0], [0, 1]]);
        // Mantissa is zero in both
        assert_eq!(c.table(31), [[1, 0], [0, 0]]);
    }

    #[test]
    fn test_sequence_skips_nan_pairs() {
        let data = [1.0f64, 2.0, f64::NAN, 3.0, 4.0];
        let mut c = BitPairCounts::new(64);
        c.add_sequence(data.iter(), None);
        // (1,2) and (3,4) only
        assert_eq!(c.n_pairs(), 2);
    }

    #[test]
    fn test_sequence_skips_masked_value() {
        let data = [1.0f32, -999.0, 2.0, 3.0];
        let mut c = BitPairCounts::new(32);
        c.add_sequence(data.iter(), Some(-999.0));
        assert_eq!(c.n_pairs(), 1);
    }

    #[test]
    fn test_sequence_skips_inexact_f32_fill_values() {
        for fill in [-999.9f64, 9.96921e36] {
            let data: Vec<f32> = (0..30)
                .map(|i| if i % 3 == 0 { fill as f32 } else { i as f32 * 0.5 })
                .collect();
            let mut c = BitPairCounts::new(32);
            c.add_sequence(data.iter(), Some(fill));
            // Every pair touches a multiple of 3 except (3k+1, 3k+2)
            assert_eq!(c.n_pairs(), 10, "fill {}", fill);
        }
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let data: Vec<f32> = (0..50).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut whole = BitPairCounts::new(32);
        whole.add_sequence(data.iter(), None);

        // Split with one element of overlap so no pair is lost
        let mut left = BitPairCounts::new(32);
        left.add_sequence(data[..20].iter(), None);
        let mut right = BitPairCounts::new(32);
        right.add_sequence(data[19..].iter(), None);

        assert_eq!(left.clone().merge(&right), whole);
        assert_eq!(right.merge(&left), whole);
    }
}
