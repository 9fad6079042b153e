use crate::types::State;

/// Exon category axis of the length-distribution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthCategory {
    /// First coding exon of a multi-exon gene
    Initial,
    /// Internal coding exon
    Internal,
    /// Last coding exon of a multi-exon gene
    Terminal,
    /// Complete single-exon gene body
    Single,
}

impl LengthCategory {
    /// Convert to an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Initial => 0,
            Self::Internal => 1,
            Self::Terminal => 2,
            Self::Single => 3,
        }
    }
}

/// Noncoding region family whose length follows a geometric distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoncodingRegion {
    /// Intron interior
    Intron,
    /// Intergenic region, untranslated flanks included
    Intergenic,
}

/// Log₂ parameters of a geometric noncoding length distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoncodingGeometry {
    /// Log₂ probability of leaving the region at a given base
    pub log_stop: f64,
    /// Log₂ probability of extending the region by one base
    pub log_continue: f64,
}

/// Contract against the externally trained probability tables a decoding
/// run consumes.
///
/// Implementations wrap whatever storage the host application loads its
/// models into; the decoder only reads. All probabilities are plain (not
/// log) values except where a method says otherwise; the decoder takes
/// logs in base 2. Length-distribution probabilities must be floored away
/// from zero by the supplier, and `length_buckets` must be at least one
/// for every category the tables cover.
pub trait ScoringModel {
    /// Cumulative coding-vs-noncoding log-odds for a reading frame,
    /// sampled at a site index. Exon coding scores are differences of two
    /// samples.
    fn coding_log_odds(&self, model: usize, frame: usize, site: usize) -> f64;

    /// Classifier probability that the site is a true signal, derived from
    /// its raw discriminant. Values at or beyond 0 and 1 are tolerated;
    /// the decoder clamps before taking odds.
    fn splice_confidence(&self, site: usize) -> f64;

    /// Probability of an exon of `codon_len` codons under the given
    /// category's length distribution.
    fn length_distribution(&self, model: usize, category: LengthCategory, codon_len: usize)
        -> f64;

    /// Number of buckets in the category's length distribution; lengths at
    /// or past the end are clamped to the last bucket.
    fn length_buckets(&self, model: usize, category: LengthCategory) -> usize;

    /// Geometric length parameters of a noncoding region family.
    fn noncoding_geometry(&self, model: usize, region: NoncodingRegion) -> NoncodingGeometry;

    /// Probability of moving between two grammar states.
    fn transition(&self, model: usize, from: State, to: State) -> f64;

    /// Signal-peptide-aware alternative coding score for a span between two
    /// site indices. `None` leaves the plain coding score in place.
    fn signal_peptide(&self, model: usize, start: usize, stop: usize) -> Option<f64> {
        let _ = (model, start, stop);
        None
    }

    /// Tail probability of a gene having at least `exons` exons. Only
    /// consulted when the exon-count correction is enabled.
    fn exon_count_tail(&self, exons: usize) -> f64 {
        let _ = exons;
        1.0
    }

    /// Size of the exon-count table; exon ordinals are capped below it.
    fn exon_count_cap(&self) -> usize {
        usize::MAX
    }
}
