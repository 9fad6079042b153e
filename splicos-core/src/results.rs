//! Backtrace queries over a decoded window.
//!
//! The sweep leaves its ranked parses in the final-position cells; the
//! methods here merge those end states, walk the backward-linked exon
//! chains, and group the recovered exons into genes. Report formatting is
//! the host application's concern.

use crate::engine::DecodedWindow;
use crate::types::{CellState, ExonCategory, ExonHypothesis, Phase, SplicosError};

/// One ranked end state of a decoded window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEnd {
    /// Cell row the parse ends in
    pub state: CellState,
    /// Rank inside that cell
    pub rank: usize,
    /// Path score of the parse
    pub score: f64,
}

/// A reconstructed exon of a reported parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exon {
    /// 1-based genomic start (leftmost base)
    pub start: usize,
    /// 1-based genomic stop (rightmost base)
    pub stop: usize,
    /// Exon category, including strand
    pub category: ExonCategory,
    /// Phase at the left boundary
    pub left_phase: Phase,
    /// Phase at the right boundary
    pub right_phase: Phase,
    /// Score of this exon alone
    pub score: f64,
}

impl Exon {
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

    fn from_hypothesis(hyp: &ExonHypothesis) -> Self {
        Self {
            start: hyp.start,
            stop: hyp.stop,
            category: hyp.category,
            left_phase: hyp.left_phase,
            right_phase: hyp.right_phase,
            score: hyp.score,
        }
    }
}

/// One gene recovered from a parse: a run of exons from the category that
/// opens a gene in genomic order to the one that closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneParse {
    /// Exons in ascending genomic order
    pub exons: Vec<Exon>,
}

impl GeneParse {
    /// Cumulative coding length of the gene in base pairs.
    #[must_use]
    pub fn coding_len(&self) -> usize {
        self.exons.iter().map(Exon::len).sum()
    }
}

impl DecodedWindow {
    /// Score and chain head of one rank of a final-position cell.
    ///
    /// # Errors
    ///
    /// Returns [`SplicosError::RankOutOfRange`] when `rank` is not below
    /// the configured prediction count.
    pub fn best(
        &self,
        state: CellState,
        rank: usize,
    ) -> Result<(f64, Option<&ExonHypothesis>), SplicosError> {
        if rank >= self.k {
            return Err(SplicosError::RankOutOfRange(rank, self.k));
        }
        let last = self.table.site_count() - 1;
        let entry = self.table.entry(state, last, rank);
        Ok((entry.score, entry.hyp.map(|id| self.arena.get(id))))
    }

    /// The K best-scoring end states of the window, best first.
    ///
    /// Parses may end intergenic or, unless complete genes are forced,
    /// inside any intron state. Unreachable ranks are omitted; ties order
    /// by state, then rank, keeping repeated queries deterministic.
    #[must_use]
    pub fn ranked(&self) -> Vec<RankedEnd> {
        let last = self.table.site_count() - 1;
        let mut ends = Vec::new();
        for state in CellState::ALL {
            if self.force_complete_genes && state != CellState::Intergenic {
                continue;
            }
            for rank in 0..self.k {
                let entry = self.table.entry(state, last, rank);
                if entry.is_occupied() {
                    ends.push(RankedEnd {
                        state,
                        rank,
                        score: entry.score,
                    });
                }
            }
        }
        ends.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.state.index().cmp(&b.state.index()))
                .then(a.rank.cmp(&b.rank))
        });
        ends.truncate(self.k);
        ends
    }

    /// The exons of the parse ending at `end`, in ascending genomic order.
    #[must_use]
    pub fn parse(&self, end: &RankedEnd) -> Vec<Exon> {
        let last = self.table.site_count() - 1;
        let mut exons = Vec::new();
        let mut cur = self.table.entry(end.state, last, end.rank).hyp;
        while let Some(id) = cur {
            let hyp = self.arena.get(id);
            exons.push(Exon::from_hypothesis(hyp));
            cur = hyp.prev;
        }
        exons.reverse();
        exons
    }

    /// The genes of the parse ending at `end`.
    ///
    /// Exons are grouped left to right; a gene closes after a forward
    /// terminal or single exon and after a reverse initial or single exon.
    /// A trailing run with no closing exon (a parse leaving the window
    /// mid-gene) is reported as a final partial gene.
    #[must_use]
    pub fn genes(&self, end: &RankedEnd) -> Vec<GeneParse> {
        let mut genes = Vec::new();
        let mut current = Vec::new();
        for exon in self.parse(end) {
            current.push(exon);
            if exon.category.closes_gene() {
                genes.push(GeneParse {
                    exons: std::mem::take(&mut current),
                });
            }
        }
        if !current.is_empty() {
            genes.push(GeneParse { exons: current });
        }
        genes
    }
}
