//! # Splicos Gene Structure Decoder
//!
//! An N-best dynamic-programming decoder for eukaryotic gene structure
//! prediction. Splicos walks an ordered index of candidate splice, start
//! and stop sites, proposes exons between compatible site pairs, scores
//! them against externally trained probability tables, and keeps the K
//! best-scoring partial gene parses in every (state, position) cell. The
//! surviving parses are reconstructed through a backward-linked chain of
//! exon records.
//!
//! ## Overview
//!
//! The grammar covers nineteen states: the intergenic state, three intron
//! phases per strand, and the single/initial/internal/terminal exon
//! categories per strand. Exon states are traversed in a single scoring
//! step, so only the seven noncoding states own ranked cells. A backward
//! candidate search at each site is bounded by per-frame stop-codon
//! cursors, keeping the sweep near-linear in the number of sites.
//!
//! Site detection, model training, sequence I/O and report formatting are
//! the host application's concerns: the decoder consumes per-strand site
//! lists, a [`ScoringModel`] implementation, and plain configuration
//! values, and emits scored, backtraceable gene structures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use splicos_core::{Decoder, DecoderConfig, SiteIndex};
//! # fn demo<M: splicos_core::ScoringModel>(model: &M,
//! #     forward: Vec<splicos_core::Site>, reverse: Vec<splicos_core::Site>,
//! #     seq: &[u8]) -> Result<(), splicos_core::SplicosError> {
//! let sites = SiteIndex::merge(forward, reverse, seq.len())?;
//! let decoder = Decoder::new(DecoderConfig::default(), &sites, seq, model)?;
//! let decoded = decoder.run();
//!
//! for end in decoded.ranked() {
//!     for gene in decoded.genes(&end) {
//!         println!("gene with {} exons, {} coding bp",
//!                  gene.exons.len(), gene.coding_len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: run configuration and per-model scoring options
//! - [`types`]: sites, grammar states, exon hypotheses, errors
//! - [`site`]: the merged, ordered candidate site index
//! - [`scoring`]: the model-table contract and the four exon scorers
//! - [`algorithms`]: the ranked cell table and the sweep itself
//! - [`engine`]: the decoder front door and parallel batch decoding
//! - [`results`]: backtrace queries, exon chains, gene grouping
//!
//! ## Error Handling
//!
//! Construction paths return [`Result<T, SplicosError>`](types::SplicosError).
//! The sweep itself has no error channel: out-of-range table lookups clamp,
//! degenerate probabilities clamp, and candidates that violate a domain
//! rule are silently pruned.

pub mod algorithms;
pub mod config;
pub mod constants;
pub mod engine;
pub mod results;
pub mod scoring;
pub mod site;
pub mod types;

pub use config::{DecoderConfig, ModelConfig, StopCodonPolicy};
pub use engine::{decode_windows, DecodedWindow, Decoder};
pub use results::{Exon, GeneParse, RankedEnd};
pub use scoring::model::{LengthCategory, NoncodingGeometry, NoncodingRegion, ScoringModel};
pub use site::SiteIndex;
pub use types::{
    CellState, ExonCategory, ExonHypothesis, Phase, Site, SiteKind, SplicosError, State,
};
