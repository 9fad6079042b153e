//! Rules applied when chaining a new exon onto an earlier parse: the
//! split-codon stop filter, the minimum-gene-length rule, and the capped
//! exon ordinal.

use bio::bio_types::strand::ReqStrand;

use crate::algorithms::dynamic_programming::nbest::{CellRef, CellTable, HypothesisArena};
use crate::config::StopCodonPolicy;
use crate::site::SiteIndex;
use crate::types::{ExonCategory, Phase, SiteKind};

/// Base at a 1-based genomic position; positions outside the window read
/// as `n` and never match a stop motif.
#[inline]
pub(crate) fn base(seq: &[u8], pos: usize) -> u8 {
    pos.checked_sub(1)
        .and_then(|i| seq.get(i))
        .copied()
        .unwrap_or(b'n')
}

/// Whether the codon split across the intron between the previous exon's
/// last base and the new exon's first base spells a stop codon of the
/// configured kind.
///
/// `phase` is the new exon's left phase: how many bases of the split codon
/// lie on the new-exon side (forward) or remain to be emitted (reverse).
/// Phase zero means no codon is split and the junction is always clean.
#[must_use]
pub fn junction_has_stop(
    seq: &[u8],
    policy: StopCodonPolicy,
    strand: ReqStrand,
    phase: Phase,
    prev_stop: usize,
    new_start: usize,
) -> bool {
    match strand {
        ReqStrand::Forward => {
            let codon = match phase {
                Phase::Zero => return false,
                Phase::One => [
                    base(seq, prev_stop.saturating_sub(1)),
                    base(seq, prev_stop),
                    base(seq, new_start),
                ],
                Phase::Two => [
                    base(seq, prev_stop),
                    base(seq, new_start),
                    base(seq, new_start + 1),
                ],
            };
            forward_stop(policy, codon)
        }
        ReqStrand::Reverse => {
            let codon = match phase {
                Phase::Zero => return false,
                Phase::One => [
                    base(seq, new_start),
                    base(seq, prev_stop),
                    base(seq, prev_stop.saturating_sub(1)),
                ],
                Phase::Two => [
                    base(seq, new_start + 1),
                    base(seq, new_start),
                    base(seq, prev_stop),
                ],
            };
            reverse_stop(policy, codon)
        }
    }
}

fn forward_stop(policy: StopCodonPolicy, codon: [u8; 3]) -> bool {
    match policy {
        StopCodonPolicy::Any => [*b"taa", *b"tga", *b"tag"].contains(&codon),
        StopCodonPolicy::OnlyTga => codon == *b"tga",
        StopCodonPolicy::OnlyTaa => codon == *b"taa",
        StopCodonPolicy::OnlyTag => codon == *b"tag",
    }
}

/// Reverse-strand stop codons as they read on the forward sequence.
fn reverse_stop(policy: StopCodonPolicy, codon: [u8; 3]) -> bool {
    match policy {
        StopCodonPolicy::Any => [*b"att", *b"act", *b"atc"].contains(&codon),
        StopCodonPolicy::OnlyTga => codon == *b"act",
        StopCodonPolicy::OnlyTaa => codon == *b"att",
        StopCodonPolicy::OnlyTag => codon == *b"atc",
    }
}

/// Whether the cumulative coding length of the parse closed by a new exon
/// of `new_len` bases reaches the configured minimum.
///
/// Walks the predecessor chain starting at `origin`, short-circuiting as
/// soon as the minimum is exceeded and stopping at the exon that opened
/// the gene. Chains that reach a window boundary or run out of committed
/// exons pass unconditionally: the window cannot prove them short.
#[must_use]
pub fn gene_length_ok(
    table: &CellTable,
    arena: &HypothesisArena,
    sites: &SiteIndex,
    min_gene_length: usize,
    new_len: usize,
    origin: CellRef,
    strand: ReqStrand,
) -> bool {
    let mut len = new_len;
    if len > min_gene_length {
        return true;
    }

    let mut cell = origin;
    let mut cur = table.entry_at(cell).hyp;
    loop {
        let Some(id) = cur else {
            return true;
        };
        let hyp = arena.get(id);
        let opens = match strand {
            ReqStrand::Forward => hyp.category == ExonCategory::Initial(ReqStrand::Forward),
            ReqStrand::Reverse => hyp.category == ExonCategory::Terminal(ReqStrand::Reverse),
        };
        if opens {
            len += hyp.len();
            return len > min_gene_length;
        }
        if sites[cell.site].kind == SiteKind::Boundary {
            return true;
        }
        len += hyp.len();
        if len > min_gene_length {
            return true;
        }
        let next_cell = table.entry_at(cell).prev;
        cur = hyp.prev;
        cell = next_cell;
    }
}

/// Ordinal of the next exon in a parse, capped below the model's
/// exon-count table size.
#[must_use]
pub fn next_ordinal(ordinal: usize, cap: usize) -> usize {
    if ordinal + 1 < cap {
        ordinal + 1
    } else {
        cap.saturating_sub(1)
    }
}
