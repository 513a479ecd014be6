//! Gap-affine penalty model.

use crate::error::AlignError;

/// Gap-affine penalty model.
///
/// A gap of length `l` costs `gap_open + gap_extend * l`, a mismatch costs
/// `mismatch` and a match is free.
///
/// Fields are private so every instance has gone through [`Penalties::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Penalties {
    mismatch: u32,
    gap_open: u32,
    gap_extend: u32,
}

impl Penalties {
    /// Validate and build a penalty model.
    ///
    /// # Arguments
    /// * `mismatch`: Cost of a substitution. Must be `>= 0`.
    /// * `gap_open`: One-off cost of starting a gap. Must be `>= 0`.
    /// * `gap_extend`: Cost per gap symbol. Must be `>= 1`.
    ///
    /// # Examples
    /// ```
    /// use rs_wfa::penalty::Penalties;
    ///
    /// let penalties = Penalties::new(4, 6, 2).unwrap();
    /// assert_eq!(penalties.gap_cost(3), 12);
    ///
    /// // Free gap extension would never terminate.
    /// assert!(Penalties::new(4, 6, 0).is_err());
    /// ```
    pub fn new(mismatch: i64, gap_open: i64, gap_extend: i64) -> Result<Self, AlignError> {
        fn weight(name: &str, value: i64, min: i64) -> Result<u32, AlignError> {
            if value < min {
                return Err(AlignError::Config(format!(
                    "{name} penalty must be at least {min}, got {value}"
                )));
            }
            u32::try_from(value).map_err(|_| {
                AlignError::Config(format!("{name} penalty {value} does not fit in 32 bits"))
            })
        }

        let penalties = Penalties {
            mismatch: weight("mismatch", mismatch, 0)?,
            gap_open: weight("gap-open", gap_open, 0)?,
            gap_extend: weight("gap-extend", gap_extend, 1)?,
        };
        // Score levels are indexed with usize and offset by these sums.
        if penalties.gap_open.checked_add(penalties.gap_extend).is_none() {
            return Err(AlignError::Config(
                "gap-open plus gap-extend overflows 32 bits".to_string(),
            ));
        }
        Ok(penalties)
    }

    /// Unit-cost edit distance (Levenshtein) as a special case of the affine model.
    pub fn edit_distance() -> Self {
        Penalties {
            mismatch: 1,
            gap_open: 0,
            gap_extend: 1,
        }
    }

    /// Substitution cost.
    pub fn mismatch(&self) -> u32 {
        self.mismatch
    }

    /// Gap opening cost.
    pub fn gap_open(&self) -> u32 {
        self.gap_open
    }

    /// Per-symbol gap cost.
    pub fn gap_extend(&self) -> u32 {
        self.gap_extend
    }

    /// Cost to open a gap and place its first symbol.
    pub fn gap_first(&self) -> u32 {
        self.gap_open + self.gap_extend
    }

    /// Cost of a single gap of `len` symbols. Zero for an empty gap.
    pub fn gap_cost(&self, len: usize) -> u64 {
        if len == 0 {
            return 0;
        }
        u64::from(self.gap_open) + u64::from(self.gap_extend) * len as u64
    }

    /// Largest score distance a recurrence looks back.
    /// The forward pass never reads a level older than `s - span`.
    pub fn span(&self) -> usize {
        std::cmp::max(self.mismatch, self.gap_first()) as usize
    }
}

impl Default for Penalties {
    /// Common DNA setting `{x: 4, o: 6, e: 2}`.
    fn default() -> Self {
        Penalties {
            mismatch: 4,
            gap_open: 6,
            gap_extend: 2,
        }
    }
}
