#![warn(missing_docs)]

//! Gap-affine wavefront alignment (WFA).
//!
//! Computes the optimal global alignment of two sequences under mismatch,
//! gap-open and gap-extend penalties in time proportional to
//! `score * (n + m)` instead of `n * m`.

pub mod align;
pub mod backtrace;
pub mod batch;
pub mod cigar;
pub mod config;
pub mod equal;
pub mod error;
pub mod expand;
pub mod extend;
pub mod heuristic;
pub mod mode;
pub mod penalty;
pub mod sequence;
pub mod task;
pub mod wavefront;

#[macro_export]
/// Ceiling division.
///
/// ```ignore
/// assert_eq!(3, ceil_div!(5, 2))
/// ```
macro_rules! ceil_div {
    ($x:expr, $y:expr) => {
        ($x + $y - 1) / $y
    };
}

pub use align::{align, Aligner, Alignment};
pub use cigar::{Cigar, EditOp};
pub use config::AlignConfig;
pub use error::AlignError;
pub use penalty::Penalties;
