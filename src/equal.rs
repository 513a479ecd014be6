//! Symbol equality.

use std::ops::Index;

/// Number of distinct byte symbols.
const MAX_UCHAR: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Defines two given symbols as equal.
pub struct EqualityPair {
    /// First symbol.
    pub first: u8,
    /// Second symbol.
    pub second: u8,
}

impl EqualityPair {
    /// Upper and lower case of each ASCII letter.
    pub fn ascii_case() -> Vec<EqualityPair> {
        (b'A'..=b'Z')
            .map(|upper| EqualityPair {
                first: upper,
                second: upper.to_ascii_lowercase(),
            })
            .collect()
    }
}

/// Defines equality relation on byte symbols.
///
/// Identity by default. Added pairs are symmetric so that swapping the two
/// sequences never changes which steps are free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityDefinition {
    matrix: Vec<bool>,
}

impl EqualityDefinition {
    /// Initialize a new `EqualityDefinition`.
    ///
    /// # Arguments
    /// * `added_equalities`: Additional equalities on top of identity.
    ///
    /// # Examples
    /// No added equalities.
    /// ```
    /// use rs_wfa::equal::EqualityDefinition;
    ///
    /// let eq_def = EqualityDefinition::new(&[]);
    /// assert!(eq_def.are_equal(b'A', b'A'));
    /// assert!(!eq_def.are_equal(b'A', b'N'));
    /// ```
    /// Make `N` also equal `A`.
    /// ```
    /// use rs_wfa::equal::{EqualityDefinition, EqualityPair};
    ///
    /// let eq_def = EqualityDefinition::new(&[EqualityPair { first: b'N', second: b'A' }]);
    /// assert!(eq_def.are_equal(b'A', b'N'));
    /// ```
    pub fn new(added_equalities: &[EqualityPair]) -> Self {
        let mut matrix = vec![false; MAX_UCHAR * MAX_UCHAR];

        for x in 0..MAX_UCHAR {
            matrix[x * MAX_UCHAR + x] = true;
        }
        for pair in added_equalities {
            let (a, b) = (usize::from(pair.first), usize::from(pair.second));
            matrix[a * MAX_UCHAR + b] = true;
            matrix[b * MAX_UCHAR + a] = true;
        }

        EqualityDefinition { matrix }
    }

    /// Case-insensitive ASCII letters.
    pub fn ignore_ascii_case() -> Self {
        Self::new(&EqualityPair::ascii_case())
    }

    /// Check if symbols are equivalent.
    #[inline]
    pub fn are_equal(&self, a: u8, b: u8) -> bool {
        self[(a, b)]
    }

    #[cfg(test)]
    fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for EqualityDefinition {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Index into `EqualityDefinition` matrix by (symbol, symbol).
impl Index<(u8, u8)> for EqualityDefinition {
    type Output = bool;

    #[inline]
    fn index(&self, index: (u8, u8)) -> &bool {
        // Every (u8, u8) pair is inside the MAX_UCHAR x MAX_UCHAR table.
        &self.matrix[usize::from(index.0) * MAX_UCHAR + usize::from(index.1)]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_init_equality_definition() {
        let eq_def = EqualityDefinition::default();
        assert_eq!(eq_def.matrix.len(), MAX_UCHAR * MAX_UCHAR);
        assert_eq!(eq_def.matrix.iter().filter(|elem| **elem).count(), MAX_UCHAR);
        assert!(eq_def.is_identity());
    }

    #[test]
    fn test_init_equality_definition_extra_def() {
        let eq_def = EqualityDefinition::new(&[EqualityPair {
            first: b'A',
            second: b'T',
        }]);
        // A == T and T == A are both added.
        assert_eq!(
            eq_def.matrix.iter().filter(|elem| **elem).count(),
            MAX_UCHAR + 2
        );
        assert!(eq_def.are_equal(b'A', b'T'));
        assert!(eq_def.are_equal(b'T', b'A'));
        assert!(!eq_def.are_equal(b'A', b'G'));
        assert!(!eq_def.is_identity());
    }

    #[test]
    fn test_self_pair_is_still_identity() {
        let eq_def = EqualityDefinition::new(&[EqualityPair {
            first: b'C',
            second: b'C',
        }]);
        assert!(eq_def.is_identity());
    }

    #[test]
    fn test_ignore_ascii_case() {
        let eq_def = EqualityDefinition::ignore_ascii_case();
        assert!(eq_def.are_equal(b'a', b'A'));
        assert!(eq_def.are_equal(b'G', b'g'));
        assert!(!eq_def.are_equal(b'a', b'c'));
    }

    #[test]
    fn test_equality_definition_index() {
        let eq_def = EqualityDefinition::default();
        assert!(eq_def[(b'T', b'T')]);
        assert!(!eq_def[(b'T', b'G')]);
    }
}
