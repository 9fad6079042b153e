use crate::constants::{DEFAULT_EXON_BOOST, DEFAULT_MIN_GENE_LENGTH, NO_SCORE};
use crate::types::SplicosError;

/// Which stop codons may terminate a coding region.
///
/// Restricting the policy also restricts the splice-junction filter: only
/// the selected codon counts as an in-frame stop when two exons are chained
/// across an intron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCodonPolicy {
    /// TAA, TAG and TGA all terminate translation
    Any,
    /// Only TGA terminates translation
    OnlyTga,
    /// Only TAA terminates translation
    OnlyTaa,
    /// Only TAG terminates translation
    OnlyTag,
}

/// Per-model scoring options.
///
/// A decoder may run several coding models over the same window; every
/// candidate exon is scored once per model and all results compete in the
/// same ranked cells.
///
/// # Examples
///
/// ```rust
/// use splicos_core::config::ModelConfig;
///
/// let model = ModelConfig {
///     splice_boost: 0.4,
///     additive_splice_terms: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    /// Scale the flat exon score by the product of the two boundary-site
    /// confidences instead of applying it unconditionally.
    ///
    /// **Default**: `false`
    pub use_dts: bool,

    /// Weight on the raw discriminant score of each boundary site.
    ///
    /// Zero selects the classifier log-odds term instead; see
    /// [`additive_splice_terms`](Self::additive_splice_terms) for combining
    /// both.
    ///
    /// **Default**: `0.0`
    pub splice_boost: f64,

    /// Add the classifier log-odds term *and* the weighted raw score for
    /// every boundary site, rather than selecting one of the two.
    ///
    /// **Default**: `false`
    pub additive_splice_terms: bool,

    /// Flat score added to every candidate exon.
    ///
    /// **Default**: `5.0`
    pub exon_boost: f64,

    /// Penalty for exons open at a window boundary; initial and terminal
    /// exons pay half of it, single exons the full amount.
    ///
    /// **Default**: `0.0`
    pub split_penalty: f64,

    /// Intergenic gaps at most this many bases wide may be skipped when
    /// anchoring a new gene to an earlier intergenic predecessor. Zero
    /// disables the walk.
    ///
    /// **Default**: `0`
    pub intergenic_gap: usize,

    /// Hysteresis applied to the stay-put score when deciding whether the
    /// earlier anchor found by the gap walk is worth adopting.
    ///
    /// **Default**: `0.0`
    pub intergenic_gap_penalty: f64,

    /// Correct candidate scores for the different geometric length
    /// distributions of introns and intergenic regions.
    ///
    /// **Default**: `true`
    pub use_intron_length_correction: bool,

    /// Keep internal-exon candidates that have no predecessor, supporting
    /// windows that begin inside a gene.
    ///
    /// **Default**: `false`
    pub allow_partial_internal: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            use_dts: false,
            splice_boost: 0.0,
            additive_splice_terms: false,
            exon_boost: DEFAULT_EXON_BOOST,
            split_penalty: 0.0,
            intergenic_gap: 0,
            intergenic_gap_penalty: 0.0,
            use_intron_length_correction: true,
            allow_partial_internal: false,
        }
    }
}

/// Configuration for one decoding run.
///
/// # Examples
///
/// ## Default configuration
///
/// ```rust
/// use splicos_core::config::DecoderConfig;
///
/// let config = DecoderConfig::default();
/// assert_eq!(config.top_predictions, 1);
/// ```
///
/// ## Ranked predictions over complete genes only
///
/// ```rust
/// use splicos_core::config::DecoderConfig;
///
/// let config = DecoderConfig {
///     top_predictions: 3,
///     force_complete_genes: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Number of ranked hypotheses kept per cell and reported per window
    /// (K of the N-best search).
    ///
    /// **Default**: `1`
    pub top_predictions: usize,

    /// Require genes to be fully contained in the window: no candidate may
    /// lean on a boundary sentinel, and only the intergenic state is read
    /// out at the window end.
    ///
    /// **Default**: `false`
    pub force_complete_genes: bool,

    /// Minimum cumulative coding length of a reported gene in base pairs.
    ///
    /// **Default**: `100`
    pub min_gene_length: usize,

    /// Bias parses toward plausible total exon counts using the model's
    /// tail distribution over the number of exons.
    ///
    /// **Default**: `false`
    pub use_exon_count_correction: bool,

    /// Which stop codons close a coding region.
    ///
    /// **Default**: [`StopCodonPolicy::Any`]
    pub stop_codon_policy: StopCodonPolicy,

    /// Stop-codon sites below this raw score never terminate a candidate
    /// gene (they still advance the per-frame stop cursors).
    ///
    /// **Default**: `-99.0`
    pub stop_score_threshold: f64,

    /// Subtracted from every intron-state rank at the final position,
    /// penalizing parses that leave the window mid-gene.
    ///
    /// **Default**: `0.0`
    pub end_partial_penalty: f64,

    /// Background odds of starting the window inside an intron rather than
    /// an intergenic region. Ignored when
    /// [`force_complete_genes`](Self::force_complete_genes) is set.
    ///
    /// **Default**: `1.0`
    pub intron_start_odds: f64,

    /// Relative weight of each intron phase for a mid-intron window start.
    ///
    /// **Default**: `[1/3, 1/3, 1/3]`
    pub intron_phase_weights: [f64; 3],

    /// Per-model scoring options; every candidate is scored under each
    /// entry.
    ///
    /// **Default**: one default [`ModelConfig`]
    pub models: Vec<ModelConfig>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            top_predictions: 1,
            force_complete_genes: false,
            min_gene_length: DEFAULT_MIN_GENE_LENGTH,
            use_exon_count_correction: false,
            stop_codon_policy: StopCodonPolicy::Any,
            stop_score_threshold: NO_SCORE,
            end_partial_penalty: 0.0,
            intron_start_odds: 1.0,
            intron_phase_weights: [1.0 / 3.0; 3],
            models: vec![ModelConfig::default()],
        }
    }
}

impl DecoderConfig {
    /// Check the structural constraints a decoder relies on.
    ///
    /// # Errors
    ///
    /// Returns [`SplicosError::InvalidPredictionCount`] when
    /// `top_predictions` is zero and [`SplicosError::NoModels`] when the
    /// model list is empty.
    pub fn validate(&self) -> Result<(), SplicosError> {
        if self.top_predictions == 0 {
            return Err(SplicosError::InvalidPredictionCount);
        }
        if self.models.is_empty() {
            return Err(SplicosError::NoModels);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DecoderConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_predictions_rejected() {
        let config = DecoderConfig {
            top_predictions: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SplicosError::InvalidPredictionCount)
        ));
    }

    #[test]
    fn empty_model_list_rejected() {
        let config = DecoderConfig {
            models: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SplicosError::NoModels)));
    }
}
