//! Run-length edit scripts: rendering, parsing, validation and re-scoring.

use std::{fmt, str::FromStr};

use anyhow::{bail, Context};

use crate::{equal::EqualityDefinition, penalty::Penalties};

/// Describes CIGAR format.
/// * See http://samtools.github.io/hts-specs/SAMv1.pdf
/// * See http://drive5.com/usearch/manual/cigar.html
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CigarFormat {
    #[default]
    /// Match: 'M', Insertion: 'I', Deletion: 'D', Mismatch: 'X'.
    Wfa,
    /// Match: '=', Insertion: 'I', Deletion: 'D', Mismatch: 'X'.
    Extended,
    /// Match: 'M', Insertion: 'I', Deletion: 'D', Mismatch: 'M'.
    Standard,
}

/// Single alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Match
    Match,
    /// Mismatch
    Mismatch,
    /// Gap in first sequence = symbol only in second sequence.
    ///
    /// ### Example:
    /// * Seq1: `A-CG`
    /// * Seq2: `ATCG`
    Insertion,
    /// Gap in second sequence = symbol only in first sequence.
    ///
    /// ### Example:
    /// * Seq1: `ATCG`
    /// * Seq2: `A-CG`
    Deletion,
}

impl EditOp {
    /// Letter in a given format.
    pub fn symbol(self, format: CigarFormat) -> char {
        match (self, format) {
            (EditOp::Match, CigarFormat::Extended) => '=',
            (EditOp::Match, _) | (EditOp::Mismatch, CigarFormat::Standard) => 'M',
            (EditOp::Mismatch, _) => 'X',
            (EditOp::Insertion, _) => 'I',
            (EditOp::Deletion, _) => 'D',
        }
    }

    /// Parse a letter. `M` and `=` both read as a match.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'M' | '=' => Some(EditOp::Match),
            'X' => Some(EditOp::Mismatch),
            'I' => Some(EditOp::Insertion),
            'D' => Some(EditOp::Deletion),
            _ => None,
        }
    }

    /// Consumes a symbol of the first sequence.
    pub fn consumes_seq1(self) -> bool {
        !matches!(self, EditOp::Insertion)
    }

    /// Consumes a symbol of the second sequence.
    pub fn consumes_seq2(self) -> bool {
        !matches!(self, EditOp::Deletion)
    }
}

/// Run-length edit script turning the first sequence into the second.
///
/// Adjacent runs of the same operation are always merged.
///
/// ### Example
/// ```
/// use rs_wfa::cigar::{Cigar, EditOp};
///
/// let mut cigar = Cigar::new();
/// cigar.push(EditOp::Match, 3);
/// cigar.push(EditOp::Match, 2);
/// cigar.push(EditOp::Deletion, 1);
/// assert_eq!(cigar.to_string(), "5M1D");
/// assert_eq!(cigar.seq1_len(), 6);
/// assert_eq!(cigar.seq2_len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cigar {
    runs: Vec<(EditOp, usize)>,
}

impl Cigar {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `len` copies of `op`, merging with the last run.
    pub fn push(&mut self, op: EditOp, len: usize) {
        if len == 0 {
            return;
        }
        match self.runs.last_mut() {
            Some((last, count)) if *last == op => *count += len,
            _ => self.runs.push((op, len)),
        }
    }

    /// Reverse run order. Used after building a script back to front.
    pub(crate) fn reverse(&mut self) {
        self.runs.reverse();
    }

    /// Runs in order.
    pub fn runs(&self) -> &[(EditOp, usize)] {
        &self.runs
    }

    /// One operation per alignment column.
    pub fn ops(&self) -> impl Iterator<Item = EditOp> + '_ {
        self.runs
            .iter()
            .flat_map(|(op, len)| std::iter::repeat(*op).take(*len))
    }

    /// No operation.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Symbols of the first sequence covered: matches, mismatches and deletions.
    pub fn seq1_len(&self) -> usize {
        self.len_where(EditOp::consumes_seq1)
    }

    /// Symbols of the second sequence covered: matches, mismatches and insertions.
    pub fn seq2_len(&self) -> usize {
        self.len_where(EditOp::consumes_seq2)
    }

    fn len_where(&self, pred: impl Fn(EditOp) -> bool) -> usize {
        self.runs
            .iter()
            .filter(|(op, _)| pred(*op))
            .map(|(_, len)| len)
            .sum()
    }

    /// Gap-affine cost of the script. Each run of insertions or deletions is one gap.
    pub fn score(&self, penalties: &Penalties) -> u64 {
        self.runs
            .iter()
            .map(|&(op, len)| match op {
                EditOp::Match => 0,
                EditOp::Mismatch => u64::from(penalties.mismatch()) * len as u64,
                EditOp::Insertion | EditOp::Deletion => penalties.gap_cost(len),
            })
            .sum()
    }

    /// Verify the script spells out `seq1 -> seq2` end to end, with every
    /// `M` on equal symbols and every `X` on different ones.
    pub fn check(
        &self,
        seq1: &[u8],
        seq2: &[u8],
        equality: &EqualityDefinition,
    ) -> anyhow::Result<()> {
        let (mut v, mut h) = (0usize, 0usize);
        for (column, op) in self.ops().enumerate() {
            if op.consumes_seq1() && v >= seq1.len() {
                bail!("{op:?} at column {column} runs past the end of the first sequence");
            }
            if op.consumes_seq2() && h >= seq2.len() {
                bail!("{op:?} at column {column} runs past the end of the second sequence");
            }
            match op {
                EditOp::Match | EditOp::Mismatch => {
                    let equal = equality.are_equal(seq1[v], seq2[h]);
                    if equal != (op == EditOp::Match) {
                        bail!(
                            "{op:?} at column {column} pairs '{}' with '{}'",
                            seq1[v] as char,
                            seq2[h] as char
                        );
                    }
                    v += 1;
                    h += 1;
                }
                EditOp::Insertion => h += 1,
                EditOp::Deletion => v += 1,
            }
        }
        if v != seq1.len() || h != seq2.len() {
            bail!(
                "script covers {v}/{} symbols of the first sequence and {h}/{} of the second",
                seq1.len(),
                seq2.len()
            );
        }
        Ok(())
    }

    /// Render in a given [`CigarFormat`].
    pub fn to_string_as(&self, format: CigarFormat) -> String {
        // Standard folds mismatches into matches; rebuild so they merge.
        let mut folded = Cigar::new();
        for &(op, len) in &self.runs {
            let op = match (op, format) {
                (EditOp::Mismatch, CigarFormat::Standard) => EditOp::Match,
                _ => op,
            };
            folded.push(op, len);
        }
        folded
            .runs
            .iter()
            .map(|(op, len)| format!("{len}{}", op.symbol(format)))
            .collect()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (op, len) in &self.runs {
            write!(f, "{len}{}", op.symbol(CigarFormat::Wfa))?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = anyhow::Error;

    /// Run-length decode `<len><letter>` pairs.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut cigar = Cigar::new();
        let mut digits = String::new();
        for symbol in s.chars() {
            if symbol.is_ascii_digit() {
                digits.push(symbol);
                continue;
            }
            let Some(op) = EditOp::from_symbol(symbol) else {
                bail!("invalid CIGAR operation '{symbol}' in {s:?}");
            };
            if digits.is_empty() {
                bail!("CIGAR operation '{symbol}' without a length in {s:?}");
            }
            let len: usize = digits
                .parse()
                .with_context(|| format!("invalid run length {digits:?} in {s:?}"))?;
            cigar.push(op, len);
            digits.clear();
        }
        if !digits.is_empty() {
            bail!("CIGAR {s:?} ends with a dangling length");
        }
        Ok(cigar)
    }
}

impl FromIterator<EditOp> for Cigar {
    fn from_iter<T: IntoIterator<Item = EditOp>>(iter: T) -> Self {
        let mut cigar = Cigar::new();
        for op in iter {
            cigar.push(op, 1);
        }
        cigar
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_push_merges_runs() {
        let cigar: Cigar = [
            EditOp::Match,
            EditOp::Match,
            EditOp::Mismatch,
            EditOp::Deletion,
            EditOp::Insertion,
            EditOp::Insertion,
        ]
        .into_iter()
        .collect();
        assert_eq!(cigar.to_string(), "2M1X1D2I");
        assert_eq!(cigar.runs().len(), 4);
    }

    #[test]
    fn test_zero_length_ignored() {
        let mut cigar = Cigar::new();
        cigar.push(EditOp::Match, 0);
        assert!(cigar.is_empty());
        assert_eq!(cigar.to_string(), "");
    }

    #[test]
    fn test_formats() {
        let cigar: Cigar = "3M1X4M1D7M1I9M1X6M".parse().unwrap();
        assert_eq!(cigar.to_string_as(CigarFormat::Wfa), "3M1X4M1D7M1I9M1X6M");
        assert_eq!(
            cigar.to_string_as(CigarFormat::Extended),
            "3=1X4=1D7=1I9=1X6="
        );
        assert_eq!(cigar.to_string_as(CigarFormat::Standard), "8M1D7M1I16M");
    }

    #[test]
    fn test_parse_merges_and_accepts_equals() {
        let cigar: Cigar = "2=3M1X".parse().unwrap();
        assert_eq!(cigar.runs(), &[(EditOp::Match, 5), (EditOp::Mismatch, 1)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("3Q".parse::<Cigar>().is_err());
        assert!("M".parse::<Cigar>().is_err());
        assert!("3M4".parse::<Cigar>().is_err());
    }

    #[test]
    fn test_lengths_and_score() {
        let cigar: Cigar = "3M1X4M1D7M1I9M1X6M".parse().unwrap();
        assert_eq!(cigar.seq1_len(), 32);
        assert_eq!(cigar.seq2_len(), 32);
        let penalties = Penalties::new(4, 6, 2).unwrap();
        assert_eq!(cigar.score(&penalties), 24);

        let gaps: Cigar = "2I3D".parse().unwrap();
        assert_eq!(gaps.score(&penalties), 10 + 12);
    }

    #[test]
    fn test_check() {
        let eq = EqualityDefinition::default();
        let cigar: Cigar = "2M1X1D1M".parse().unwrap();
        assert!(cigar.check(b"ACGTA", b"ACTA", &eq).is_ok());
        // Wrong letter for the pair.
        assert!(cigar.check(b"ACTTA", b"ACTA", &eq).is_err());
        // Too short.
        assert!(cigar.check(b"ACGTAA", b"ACTA", &eq).is_err());
        // Too long.
        assert!(cigar.check(b"ACGT", b"ACTA", &eq).is_err());
    }
}
