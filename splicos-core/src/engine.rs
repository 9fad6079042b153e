//! The decoder front door: wire a configuration, a site index, the window
//! sequence, and a scoring model together, run the sweep, and hand back a
//! queryable result.

use log::debug;
use rayon::prelude::*;

use crate::algorithms::dynamic_programming::sweep::run_sweep;
use crate::algorithms::dynamic_programming::{CellTable, HypothesisArena};
use crate::config::DecoderConfig;
use crate::scoring::model::ScoringModel;
use crate::site::SiteIndex;
use crate::types::{CellState, SplicosError};

/// One decoding task: a site index, the window sequence, a scoring model
/// and a configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use splicos_core::{Decoder, DecoderConfig, SiteIndex};
/// # fn demo<M: splicos_core::ScoringModel>(model: &M) -> Result<(), splicos_core::SplicosError> {
/// let sites = SiteIndex::merge(Vec::new(), Vec::new(), 300)?;
/// let seq = vec![b'a'; 300];
/// let decoder = Decoder::new(DecoderConfig::default(), &sites, &seq, model)?;
/// let decoded = decoder.run();
/// for end in decoded.ranked() {
///     println!("score {:.3}: {} genes", end.score, decoded.genes(&end).len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Decoder<'a, M: ScoringModel> {
    config: DecoderConfig,
    sites: &'a SiteIndex,
    seq: Vec<u8>,
    model: &'a M,
}

impl<'a, M: ScoringModel> Decoder<'a, M> {
    /// Build a decoder after validating the configuration against the
    /// window.
    ///
    /// The sequence is kept as a lowercase copy; only the split-codon
    /// junction filter reads it.
    ///
    /// # Errors
    ///
    /// Returns a [`SplicosError`] when the configuration is structurally
    /// invalid or the sequence length disagrees with the site index.
    pub fn new(
        config: DecoderConfig,
        sites: &'a SiteIndex,
        seq: &[u8],
        model: &'a M,
    ) -> Result<Self, SplicosError> {
        config.validate()?;
        if seq.len() != sites.seq_len() {
            return Err(SplicosError::SequenceLengthMismatch(
                seq.len(),
                sites.seq_len(),
            ));
        }
        Ok(Self {
            config,
            sites,
            seq: seq.to_ascii_lowercase(),
            model,
        })
    }

    /// The configuration this decoder runs under.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Run the sweep over the whole window.
    #[must_use]
    pub fn run(&self) -> DecodedWindow {
        let (mut table, arena) = run_sweep(&self.config, self.sites, &self.seq, self.model);

        // parses still inside a gene at the window end pay for leaving it
        // unfinished
        let last = self.sites.last_index();
        for state in CellState::ALL {
            if state != CellState::Intergenic {
                table.shift_scores(state, last, -self.config.end_partial_penalty);
            }
        }

        debug!(
            "decoded window of {} bp over {} sites: {} hypotheses kept",
            self.sites.seq_len(),
            self.sites.len(),
            arena.len()
        );

        DecodedWindow {
            table,
            arena,
            k: self.config.top_predictions,
            force_complete_genes: self.config.force_complete_genes,
        }
    }
}

/// The filled cell table of one window, ready for backtrace queries.
///
/// Owns every hypothesis chain created during the sweep; dropping the
/// window reclaims them all at once.
#[derive(Debug)]
pub struct DecodedWindow {
    pub(crate) table: CellTable,
    pub(crate) arena: HypothesisArena,
    pub(crate) k: usize,
    pub(crate) force_complete_genes: bool,
}

impl DecodedWindow {
    /// Ranked hypotheses kept per cell.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Read access to the ranked cell table.
    #[must_use]
    pub const fn cells(&self) -> &CellTable {
        &self.table
    }

    /// The arena owning every hypothesis referenced by the table.
    #[must_use]
    pub const fn hypotheses(&self) -> &HypothesisArena {
        &self.arena
    }
}

/// Decode a batch of independent windows in parallel.
///
/// Every window is validated first; the sweeps then run on the rayon pool.
/// Windows are independent, so the result order matches the input order.
///
/// # Errors
///
/// Returns the first validation error across the batch.
pub fn decode_windows<M>(
    config: &DecoderConfig,
    windows: &[(&SiteIndex, &[u8])],
    model: &M,
) -> Result<Vec<DecodedWindow>, SplicosError>
where
    M: ScoringModel + Sync,
{
    let decoders = windows
        .iter()
        .map(|&(sites, seq)| Decoder::new(config.clone(), sites, seq, model))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(decoders.par_iter().map(Decoder::run).collect())
}
