//! The pair of sequences being aligned and its grid geometry.

use crate::{equal::EqualityDefinition, error::AlignError};

/// Two read-only sequences aligned end to end.
///
/// Rows `v` index `seq1` (length `n`), columns `h` index `seq2` (length `m`).
/// A diagonal is `k = h - v` and spans `[-n, m]`.
#[derive(Debug, Clone, Copy)]
pub struct SequencePair<'a> {
    seq1: &'a [u8],
    seq2: &'a [u8],
    n: i32,
    m: i32,
    equality: &'a EqualityDefinition,
    free_mismatch: bool,
}

/// Longest supported sequence.
const MAX_LEN: i32 = i32::MAX - 1;

fn grid_len(len: usize) -> Result<i32, AlignError> {
    i32::try_from(len)
        .ok()
        .filter(|&len| len <= MAX_LEN)
        .ok_or_else(|| {
            AlignError::Config(format!(
                "sequence of length {len} exceeds the supported maximum of {MAX_LEN}"
            ))
        })
}

impl<'a> SequencePair<'a> {
    /// Wrap two sequences.
    ///
    /// # Arguments
    /// * `seq1`: First sequence. Rows of the alignment grid.
    /// * `seq2`: Second sequence. Columns of the alignment grid.
    /// * `equality`: Which symbols count as a match.
    /// * `free_mismatch`: Whether a substitution costs nothing, making every diagonal step free.
    ///
    /// # Errors
    /// Lengths of `i32::MAX` or more are a configuration error, so that
    /// `h + 1` and `k + 1` stay in range for every cell of the grid.
    pub fn new(
        seq1: &'a [u8],
        seq2: &'a [u8],
        equality: &'a EqualityDefinition,
        free_mismatch: bool,
    ) -> Result<Self, AlignError> {
        Ok(SequencePair {
            seq1,
            seq2,
            n: grid_len(seq1.len())?,
            m: grid_len(seq2.len())?,
            equality,
            free_mismatch,
        })
    }

    /// Length of `seq1`.
    pub fn n(&self) -> i32 {
        self.n
    }

    /// Length of `seq2`.
    pub fn m(&self) -> i32 {
        self.m
    }

    /// Diagonal holding the bottom-right corner.
    pub fn end_diagonal(&self) -> i32 {
        self.m - self.n
    }

    /// Whether offset `h` on diagonal `k` is the bottom-right corner.
    pub fn is_end(&self, k: i32, h: i32) -> bool {
        k == self.end_diagonal() && h >= self.m
    }

    /// Whether `(v, h)` lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, v: i32, h: i32) -> bool {
        (0..=self.n).contains(&v) && (0..=self.m).contains(&h)
    }

    /// Whether the symbols at row `v`, column `h` agree.
    /// Both must be strictly inside the sequences.
    #[inline]
    pub fn symbols_match(&self, v: i32, h: i32) -> bool {
        self.equality
            .are_equal(self.seq1[v as usize], self.seq2[h as usize])
    }

    /// Whether stepping diagonally from `(v, h)` costs nothing.
    #[inline]
    pub fn free_step(&self, v: i32, h: i32) -> bool {
        self.free_mismatch || self.symbols_match(v, h)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_geometry() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(b"ACGT", b"ACGTAA", &eq, false).unwrap();
        assert_eq!(pair.n(), 4);
        assert_eq!(pair.m(), 6);
        assert_eq!(pair.end_diagonal(), 2);
        assert!(pair.is_end(2, 6));
        assert!(!pair.is_end(2, 5));
        assert!(!pair.is_end(0, 6));
        assert!(pair.in_bounds(4, 6));
        assert!(!pair.in_bounds(5, 6));
        assert!(!pair.in_bounds(-1, 0));
    }

    #[test]
    fn test_grid_len_limit() {
        assert_eq!(grid_len(0), Ok(0));
        assert_eq!(grid_len(MAX_LEN as usize), Ok(MAX_LEN));
        assert!(matches!(
            grid_len(i32::MAX as usize),
            Err(AlignError::Config(_))
        ));
        assert!(matches!(
            grid_len(usize::MAX),
            Err(AlignError::Config(_))
        ));
    }

    #[test]
    fn test_free_step() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(b"AC", b"AG", &eq, false).unwrap();
        assert!(pair.free_step(0, 0));
        assert!(!pair.free_step(1, 1));

        let free = SequencePair::new(b"AC", b"AG", &eq, true).unwrap();
        assert!(free.free_step(1, 1));
        assert!(!free.symbols_match(1, 1));
    }
}
