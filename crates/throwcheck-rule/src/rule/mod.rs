//! The unhandled-failure rule.
//!
//! - [`obligations`] - reads the failure-obligation marker off declarations
//! - [`coverage`] - decides whether a call site's obligation is discharged
//! - [`unhandled`] - the lint pass tying both together

pub mod coverage;
pub mod obligations;
pub mod unhandled;

pub use coverage::{Coverage, CoverageChecker, EmptyObligationPolicy};
pub use obligations::{extract, MarkerMatcher, ObligationSet};
pub use unhandled::{check_program, check_tree};
