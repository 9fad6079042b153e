use std::fmt;

use bio::bio_types::strand::{ReqStrand, Strand};
use thiserror::Error;

use crate::constants::NONCODING_STATES;

/// Kind of motif a candidate site was called on.
///
/// `Boundary` is reserved for the two synthetic sentinels capping a site
/// index; detector output never contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SiteKind {
    /// Synthetic sequence-boundary sentinel
    Boundary,
    /// Translation start codon (ATG)
    Start,
    /// Donor splice site (GT)
    Donor,
    /// Acceptor splice site (AG)
    Acceptor,
    /// Stop codon (TAA, TAG, TGA)
    Stop,
}

/// A candidate splice/start/stop position produced by an external detector.
///
/// Positions are 1-based genomic coordinates inside the window; the score is
/// the detector's raw discriminant for the motif. Sites whose discriminant
/// fell below the detector threshold arrive with [`NO_SCORE`](crate::constants::NO_SCORE)
/// and still occupy index slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Motif kind at this position
    pub kind: SiteKind,
    /// Strand the motif was called on; `Unknown` for boundary sentinels
    pub strand: Strand,
    /// 1-based genomic position of the first (forward) or last (reverse)
    /// base of the motif
    pub pos: usize,
    /// Raw discriminant score from the site detector
    pub score: f64,
}

/// Reading-frame phase of a partial codon at an exon boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Codon boundary coincides with the exon boundary
    Zero,
    /// One base of the codon falls on the near side
    One,
    /// Two bases of the codon fall on the near side
    Two,
}

impl Phase {
    /// All phases, in index order.
    pub const ALL: [Self; 3] = [Self::Zero, Self::One, Self::Two];

    /// Phase of a length or offset (its remainder modulo 3).
    #[must_use]
    pub const fn of(n: usize) -> Self {
        match n % 3 {
            0 => Self::Zero,
            1 => Self::One,
            _ => Self::Two,
        }
    }

    /// Phase of `len - rhs`, safe when `rhs` exceeds `len`.
    #[must_use]
    pub fn of_diff(len: usize, rhs: Self) -> Self {
        let d = (len as i64 - rhs.index() as i64).rem_euclid(3);
        Self::of(d as usize)
    }

    /// Convert to an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// One of the nineteen grammar states of the gene model.
///
/// The intron phase records how many bases of the interrupted codon lie
/// upstream of the intron. External transition tables are indexed through
/// [`State::index`], which follows the conventional flat ordering
/// (intergenic, forward then reverse introns by phase, then the forward and
/// reverse exon states).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    /// Between genes (also covers untranslated flanks)
    Intergenic,
    /// Inside an intron with the given phase
    Intron(ReqStrand, Phase),
    /// Single-exon gene body
    SingleExon(ReqStrand),
    /// First coding exon of a multi-exon gene
    InitialExon(ReqStrand),
    /// Internal coding exon; the phase is the right-boundary phase
    InternalExon(ReqStrand, Phase),
    /// Last coding exon of a multi-exon gene
    TerminalExon(ReqStrand),
}

impl State {
    /// Flat index into a transition table, 0..19.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Intergenic => 0,
            Self::Intron(ReqStrand::Forward, p) => 1 + p.index(),
            Self::Intron(ReqStrand::Reverse, p) => 4 + p.index(),
            Self::SingleExon(ReqStrand::Forward) => 7,
            Self::InitialExon(ReqStrand::Forward) => 8,
            Self::InternalExon(ReqStrand::Forward, p) => 9 + p.index(),
            Self::TerminalExon(ReqStrand::Forward) => 12,
            Self::SingleExon(ReqStrand::Reverse) => 13,
            Self::InitialExon(ReqStrand::Reverse) => 14,
            Self::InternalExon(ReqStrand::Reverse, p) => 15 + p.index(),
            Self::TerminalExon(ReqStrand::Reverse) => 18,
        }
    }
}

/// One of the seven noncoding states that own a row of dynamic-programming
/// cells. Exon states never hold cells: an exon is scored in one step
/// between two noncoding states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellState {
    /// Intergenic row
    Intergenic,
    /// Intron row for a strand and phase
    Intron(ReqStrand, Phase),
}

impl CellState {
    /// All cell-owning states, in index order.
    pub const ALL: [Self; NONCODING_STATES] = [
        Self::Intergenic,
        Self::Intron(ReqStrand::Forward, Phase::Zero),
        Self::Intron(ReqStrand::Forward, Phase::One),
        Self::Intron(ReqStrand::Forward, Phase::Two),
        Self::Intron(ReqStrand::Reverse, Phase::Zero),
        Self::Intron(ReqStrand::Reverse, Phase::One),
        Self::Intron(ReqStrand::Reverse, Phase::Two),
    ];

    /// Row index into the cell table, 0..7.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Intergenic => 0,
            Self::Intron(ReqStrand::Forward, p) => 1 + p.index(),
            Self::Intron(ReqStrand::Reverse, p) => 4 + p.index(),
        }
    }

    /// The grammar state this cell row belongs to.
    #[must_use]
    pub const fn to_state(self) -> State {
        match self {
            Self::Intergenic => State::Intergenic,
            Self::Intron(s, p) => State::Intron(s, p),
        }
    }
}

/// Category of a candidate exon, per strand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExonCategory {
    /// First coding exon of a multi-exon gene
    Initial(ReqStrand),
    /// Internal coding exon
    Internal(ReqStrand),
    /// Last coding exon of a multi-exon gene
    Terminal(ReqStrand),
    /// Complete single-exon gene body
    Single(ReqStrand),
}

impl ExonCategory {
    /// Numeric encoding used in trace output: forward categories 0..4,
    /// reverse categories 4..8.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Initial(ReqStrand::Forward) => 0,
            Self::Internal(ReqStrand::Forward) => 1,
            Self::Terminal(ReqStrand::Forward) => 2,
            Self::Single(ReqStrand::Forward) => 3,
            Self::Initial(ReqStrand::Reverse) => 4,
            Self::Internal(ReqStrand::Reverse) => 5,
            Self::Terminal(ReqStrand::Reverse) => 6,
            Self::Single(ReqStrand::Reverse) => 7,
        }
    }

    /// Strand the exon codes on.
    #[must_use]
    pub const fn strand(self) -> ReqStrand {
        match self {
            Self::Initial(s) | Self::Internal(s) | Self::Terminal(s) | Self::Single(s) => s,
        }
    }

    /// Whether this exon is the 5'-most exon of its gene in genomic order.
    #[must_use]
    pub const fn opens_gene(self) -> bool {
        matches!(
            self,
            Self::Initial(ReqStrand::Forward)
                | Self::Single(ReqStrand::Forward)
                | Self::Terminal(ReqStrand::Reverse)
                | Self::Single(ReqStrand::Reverse)
        )
    }

    /// Whether this exon is the 3'-most exon of its gene in genomic order.
    #[must_use]
    pub const fn closes_gene(self) -> bool {
        matches!(
            self,
            Self::Terminal(ReqStrand::Forward)
                | Self::Single(ReqStrand::Forward)
                | Self::Initial(ReqStrand::Reverse)
                | Self::Single(ReqStrand::Reverse)
        )
    }
}

impl fmt::Display for ExonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial(_) => "Initial",
            Self::Internal(_) => "Internal",
            Self::Terminal(_) => "Terminal",
            Self::Single(_) => "Single",
        };
        let strand = match self.strand() {
            ReqStrand::Forward => '+',
            ReqStrand::Reverse => '-',
        };
        write!(f, "{name}{strand}")
    }
}

/// Handle to an [`ExonHypothesis`] stored in a
/// [`HypothesisArena`](crate::algorithms::dynamic_programming::HypothesisArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypId(pub(crate) u32);

/// A scored candidate exon in a partial gene parse.
///
/// Hypotheses form a backward-linked chain through `prev`: several ranked
/// parses may share the same predecessor record, so the chain is a shared
/// backward DAG. Records are immutable once inserted into a cell and are
/// reclaimed together with the arena at the end of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ExonHypothesis {
    /// 1-based genomic start of the exon (leftmost base)
    pub start: usize,
    /// 1-based genomic stop of the exon (rightmost base)
    pub stop: usize,
    /// Exon category, including strand
    pub category: ExonCategory,
    /// Phase of the partial codon at the left boundary
    pub left_phase: Phase,
    /// Phase of the partial codon at the right boundary
    pub right_phase: Phase,
    /// Log score of this exon alone (path scores live in the cell table)
    pub score: f64,
    /// Number of exons so far in the parse, capped by the model's
    /// exon-count table size
    pub ordinal: usize,
    /// The exon ending the previous coding segment of this parse
    pub prev: Option<HypId>,
}

impl ExonHypothesis {
    /// Exon length in base pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Whether the coordinate span is degenerate.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stop < self.start
    }
}

/// Error types surfaced while building a decoder or querying its results.
#[derive(Error, Debug)]
pub enum SplicosError {
    /// Per-strand site lists must be strictly ascending by position
    #[error("unsorted site list at entry {0}")]
    UnsortedSites(usize),
    /// A site position fell outside the sequence window
    #[error("site position {0} outside sequence of length {1}")]
    SitePositionOutOfRange(usize, usize),
    /// Boundary sentinels are added by the index itself
    #[error("boundary site in detector input at entry {0}")]
    BoundaryInInput(usize),
    /// A site was listed under the wrong strand
    #[error("site strand mismatch at entry {0}")]
    StrandMismatch(usize),
    /// The number of ranked predictions must be at least one
    #[error("prediction count must be at least 1")]
    InvalidPredictionCount,
    /// At least one model configuration is required
    #[error("no model configuration supplied")]
    NoModels,
    /// The window sequence and the site index disagree on length
    #[error("sequence length {0} does not match site index window of {1}")]
    SequenceLengthMismatch(usize, usize),
    /// A requested rank exceeds the configured prediction count
    #[error("rank {0} out of range for {1} predictions")]
    RankOutOfRange(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_of_wraps_modulo_three() {
        assert_eq!(Phase::of(0), Phase::Zero);
        assert_eq!(Phase::of(4), Phase::One);
        assert_eq!(Phase::of(90), Phase::Zero);
        assert_eq!(Phase::of(63), Phase::Zero);
    }

    #[test]
    fn phase_of_diff_handles_small_lengths() {
        assert_eq!(Phase::of_diff(1, Phase::Two), Phase::Two);
        assert_eq!(Phase::of_diff(84, Phase::Zero), Phase::Zero);
        assert_eq!(Phase::of_diff(10, Phase::One), Phase::Zero);
    }

    #[test]
    fn state_indices_are_distinct_and_cover_the_table() {
        let mut seen = [false; 19];
        let mut states = vec![State::Intergenic];
        for strand in [ReqStrand::Forward, ReqStrand::Reverse] {
            for p in Phase::ALL {
                states.push(State::Intron(strand, p));
                states.push(State::InternalExon(strand, p));
            }
            states.push(State::SingleExon(strand));
            states.push(State::InitialExon(strand));
            states.push(State::TerminalExon(strand));
        }
        for s in states {
            let i = s.index();
            assert!(i < 19);
            assert!(!seen[i], "state index {i} assigned twice");
            seen[i] = true;
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn cell_state_indices_match_all_ordering() {
        for (i, s) in CellState::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn cell_states_embed_into_grammar_states() {
        assert_eq!(CellState::Intergenic.to_state().index(), 0);
        assert_eq!(
            CellState::Intron(ReqStrand::Reverse, Phase::Two)
                .to_state()
                .index(),
            6
        );
    }

    #[test]
    fn exon_category_gene_boundaries() {
        assert!(ExonCategory::Initial(ReqStrand::Forward).opens_gene());
        assert!(ExonCategory::Terminal(ReqStrand::Reverse).opens_gene());
        assert!(ExonCategory::Terminal(ReqStrand::Forward).closes_gene());
        assert!(ExonCategory::Initial(ReqStrand::Reverse).closes_gene());
        assert!(ExonCategory::Single(ReqStrand::Forward).opens_gene());
        assert!(ExonCategory::Single(ReqStrand::Forward).closes_gene());
        assert!(!ExonCategory::Internal(ReqStrand::Forward).opens_gene());
    }
}
