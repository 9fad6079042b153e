//! Candidate exon scoring.
//!
//! [`model`] defines the contract the decoder holds against externally
//! trained probability tables; [`exon`] combines those tables into one log
//! score per candidate exon.

pub mod exon;
pub mod model;

pub use exon::{
    score_initial_exon, score_internal_exon, score_single_exon, score_terminal_exon, ScoreInputs,
    ScoredExon,
};
pub use model::{LengthCategory, NoncodingGeometry, NoncodingRegion, ScoringModel};
