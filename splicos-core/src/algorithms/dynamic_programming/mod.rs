//! The N-best dynamic program over the site index.
//!
//! [`nbest`] owns the ranked cell storage and the hypothesis arena,
//! [`junction`] holds the rules for chaining exons across introns, and
//! [`sweep`] drives the left-to-right pass itself.

pub mod junction;
pub mod nbest;
pub(crate) mod sweep;

pub use nbest::{CellEntry, CellRef, CellTable, HypothesisArena};
