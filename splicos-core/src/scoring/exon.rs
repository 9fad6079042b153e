//! The four candidate exon scoring functions.
//!
//! Each function takes two site-index positions, derives the exon
//! coordinates and boundary phases for its category and strand, and folds
//! the model tables into one log₂ score: transition term, coding log-odds,
//! boundary-site confidence, exon length distribution, and the geometric
//! noncoding corrections. The returned record also names the cell rows the
//! sweep reads predecessors from and inserts results into.

use bio::bio_types::strand::ReqStrand;

use crate::config::ModelConfig;
use crate::constants::{PROBABILITY_FLOOR, SIGNAL_ALT_WEIGHT, SIGNAL_CODING_WEIGHT};
use crate::scoring::model::{LengthCategory, NoncodingRegion, ScoringModel};
use crate::site::SiteIndex;
use crate::types::{CellState, ExonCategory, ExonHypothesis, Phase, SiteKind, State};

/// Read-only inputs shared by every scoring call of a run.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a, M: ScoringModel> {
    /// The window's ordered site index
    pub sites: &'a SiteIndex,
    /// The external probability tables
    pub model: &'a M,
}

/// A scored candidate exon plus the cell rows it connects.
#[derive(Debug, Clone)]
pub struct ScoredExon {
    /// The exon record, with no predecessor attached yet
    pub hyp: ExonHypothesis,
    /// Cell row whose entries supply predecessors (at the earlier site)
    pub source: CellState,
    /// Cell row the chained result is inserted into (at the current site)
    pub dest: CellState,
}

/// Score an initial exon between a start-codon site and a donor site
/// (forward) or between a reverse start-codon site and an earlier reverse
/// donor site.
///
/// Forward initial exons may end open at the window boundary; the reverse
/// form may begin open. Both pay half the split penalty.
#[must_use]
pub fn score_initial_exon<M: ScoringModel>(
    inputs: &ScoreInputs<'_, M>,
    mc: &ModelConfig,
    m: usize,
    start: usize,
    stop: usize,
    dir: ReqStrand,
) -> ScoredExon {
    let sites = inputs.sites;
    let model = inputs.model;
    let seq_len = sites.seq_len();

    let (exon_start, exon_stop, left_phase, right_phase, ordinal, category, source, dest, frame);
    let mut trans;
    match dir {
        ReqStrand::Forward => {
            exon_start = sites[start].pos;
            exon_stop = sites[stop].pos.saturating_sub(1);
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::Zero;
            right_phase = Phase::of(len);
            ordinal = 1;
            category = ExonCategory::Initial(ReqStrand::Forward);
            source = CellState::Intergenic;
            dest = CellState::Intron(ReqStrand::Forward, right_phase);
            trans = 0.5
                * model
                    .transition(m, State::InitialExon(ReqStrand::Forward), dest.to_state())
                    .log2();
            frame = (exon_start.saturating_sub(1)) % 3;
        }
        ReqStrand::Reverse => {
            exon_start = sites[stop].pos + 1;
            exon_stop = sites[start].pos;
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::of(len);
            right_phase = Phase::Zero;
            ordinal = 2;
            category = ExonCategory::Initial(ReqStrand::Reverse);
            source = CellState::Intron(ReqStrand::Reverse, left_phase);
            dest = CellState::Intergenic;
            trans = 0.5
                * model
                    .transition(m, source.to_state(), State::InitialExon(ReqStrand::Reverse))
                    .log2();
            frame = (seq_len - exon_stop) % 3;
        }
    }
    let len = exon_stop.saturating_sub(exon_start) + 1;

    let coding = model.coding_log_odds(m, frame, stop) - model.coding_log_odds(m, frame, start);
    let coding = blended_coding(model, m, coding, start, stop);
    let signals = splice_signals(inputs, mc, start, stop);

    let interg = model.noncoding_geometry(m, NoncodingRegion::Intergenic);
    // the intergenic exit row is shared between the strands
    trans += interg.log_stop
        + model
            .transition(m, State::Intergenic, State::InitialExon(ReqStrand::Forward))
            .log2()
        - len as f64 * interg.log_continue;

    let codon_len = clamped_codon_len(model, m, LengthCategory::Initial, len);
    let score = base_score(mc, &signals)
        + trans
        - 0.5 * mc.split_penalty
        + coding
        + signals.term
        + model
            .length_distribution(m, LengthCategory::Initial, codon_len)
            .log2();

    ScoredExon {
        hyp: ExonHypothesis {
            start: exon_start,
            stop: exon_stop,
            category,
            left_phase,
            right_phase,
            score,
            ordinal,
            prev: None,
        },
        source,
        dest,
    }
}

/// Score a terminal exon between an acceptor (or window boundary) and a
/// stop-codon site (forward), or between a reverse acceptor and the most
/// recent reverse stop-codon site.
///
/// Pays half the split penalty; the stop codon itself is part of the exon.
#[must_use]
pub fn score_terminal_exon<M: ScoringModel>(
    inputs: &ScoreInputs<'_, M>,
    mc: &ModelConfig,
    m: usize,
    start: usize,
    stop: usize,
    dir: ReqStrand,
) -> ScoredExon {
    let sites = inputs.sites;
    let model = inputs.model;
    let seq_len = sites.seq_len();
    let open_at_boundary = sites[start].kind == SiteKind::Boundary;

    let (exon_start, exon_stop, left_phase, right_phase, ordinal, category, source, dest, frame);
    let mut trans;
    match dir {
        ReqStrand::Forward => {
            let mut s = sites[start].pos + 1;
            if !open_at_boundary {
                s += 1;
            }
            exon_start = s;
            exon_stop = sites[stop].pos + 2;
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::of(len);
            right_phase = Phase::Zero;
            ordinal = 2;
            category = ExonCategory::Terminal(ReqStrand::Forward);
            source = split_codon_intron_row(ReqStrand::Forward, left_phase);
            dest = CellState::Intergenic;
            trans = 0.5
                * model
                    .transition(m, State::InitialExon(ReqStrand::Forward), source.to_state())
                    .log2();
            frame = (left_phase.index() + exon_start.saturating_sub(1)) % 3;
        }
        ReqStrand::Reverse => {
            let mut s = sites[stop].pos.saturating_sub(1);
            if !open_at_boundary {
                s = s.saturating_sub(1);
            }
            exon_start = s;
            exon_stop = sites[start].pos.saturating_sub(2);
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::Zero;
            right_phase = Phase::of(len);
            ordinal = 1;
            category = ExonCategory::Terminal(ReqStrand::Reverse);
            source = CellState::Intergenic;
            dest = split_codon_intron_row(ReqStrand::Reverse, right_phase);
            trans = 0.5
                * model
                    .transition(m, dest.to_state(), State::InitialExon(ReqStrand::Reverse))
                    .log2();
            frame = (right_phase.index() + seq_len - exon_stop) % 3;
        }
    }
    let len = exon_stop.saturating_sub(exon_start) + 1;

    let mut coding = model.coding_log_odds(m, frame, stop);
    if !open_at_boundary {
        coding -= model.coding_log_odds(m, frame, start);
    }
    let signals = splice_signals(inputs, mc, start, stop);

    let intron = model.noncoding_geometry(m, NoncodingRegion::Intron);
    let interg = model.noncoding_geometry(m, NoncodingRegion::Intergenic);
    trans += intron.log_stop
        + model
            .transition(
                m,
                State::Intron(ReqStrand::Forward, Phase::Zero),
                State::TerminalExon(ReqStrand::Forward),
            )
            .log2()
        - len as f64 * interg.log_continue;

    let codon_len = clamped_codon_len(model, m, LengthCategory::Terminal, len);
    let score = base_score(mc, &signals)
        + trans
        - 0.5 * mc.split_penalty
        + coding
        + signals.term
        + model
            .length_distribution(m, LengthCategory::Terminal, codon_len)
            .log2();

    ScoredExon {
        hyp: ExonHypothesis {
            start: exon_start,
            stop: exon_stop,
            category,
            left_phase,
            right_phase,
            score,
            ordinal,
            prev: None,
        },
        source,
        dest,
    }
}

/// Score an internal exon between an acceptor (or window boundary) and a
/// donor site. The right-boundary phase cannot be derived from the sites
/// alone and must be supplied by the caller.
#[must_use]
pub fn score_internal_exon<M: ScoringModel>(
    inputs: &ScoreInputs<'_, M>,
    mc: &ModelConfig,
    m: usize,
    start: usize,
    stop: usize,
    right_phase: Phase,
    dir: ReqStrand,
) -> ScoredExon {
    let sites = inputs.sites;
    let model = inputs.model;
    let seq_len = sites.seq_len();
    let open_at_boundary = sites[start].kind == SiteKind::Boundary;

    let (exon_start, exon_stop, left_phase, category, source, dest, frame);
    let mut trans;
    match dir {
        ReqStrand::Forward => {
            let mut s = sites[start].pos + 1;
            if !open_at_boundary {
                s += 1;
            }
            exon_start = s;
            exon_stop = sites[stop].pos.saturating_sub(1);
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::of_diff(len, right_phase);
            category = ExonCategory::Internal(ReqStrand::Forward);
            source = split_codon_intron_row(ReqStrand::Forward, left_phase);
            let exon_state = match left_phase {
                Phase::Zero => State::InternalExon(ReqStrand::Forward, Phase::Zero),
                Phase::One => State::InternalExon(ReqStrand::Forward, Phase::Two),
                Phase::Two => State::InternalExon(ReqStrand::Forward, Phase::One),
            };
            dest = CellState::Intron(ReqStrand::Forward, right_phase);
            trans = model.transition(m, exon_state, dest.to_state()).log2();
            frame = (left_phase.index() + exon_start.saturating_sub(1)) % 3;
        }
        ReqStrand::Reverse => {
            exon_start = sites[stop].pos + 1;
            let mut e = sites[start].pos.saturating_sub(1);
            if !open_at_boundary {
                e = e.saturating_sub(1);
            }
            exon_stop = e;
            let len = exon_stop.saturating_sub(exon_start) + 1;
            left_phase = Phase::of_diff(len, right_phase);
            category = ExonCategory::Internal(ReqStrand::Reverse);
            source = CellState::Intron(ReqStrand::Reverse, left_phase);
            // the reverse internal row is collapsed to phase zero
            let exon_state = State::InternalExon(ReqStrand::Reverse, Phase::Zero);
            dest = split_codon_intron_row(ReqStrand::Reverse, right_phase);
            trans = model.transition(m, source.to_state(), exon_state).log2();
            frame = (right_phase.index() + seq_len - exon_stop) % 3;
        }
    }
    let len = exon_stop.saturating_sub(exon_start) + 1;

    let mut coding = model.coding_log_odds(m, frame, stop);
    if !open_at_boundary {
        coding -= model.coding_log_odds(m, frame, start);
    }
    let signals = splice_signals(inputs, mc, start, stop);

    let intron = model.noncoding_geometry(m, NoncodingRegion::Intron);
    let interg = model.noncoding_geometry(m, NoncodingRegion::Intergenic);
    trans += intron.log_stop
        + model
            .transition(
                m,
                State::Intron(ReqStrand::Forward, Phase::Zero),
                State::InternalExon(ReqStrand::Forward, Phase::Zero),
            )
            .log2()
        - len as f64 * interg.log_continue;

    let codon_len = clamped_codon_len(model, m, LengthCategory::Internal, len);
    let score = base_score(mc, &signals)
        + trans
        + coding
        + signals.term
        + model
            .length_distribution(m, LengthCategory::Internal, codon_len)
            .log2();

    ScoredExon {
        hyp: ExonHypothesis {
            start: exon_start,
            stop: exon_stop,
            category,
            left_phase,
            right_phase,
            score,
            ordinal: 2,
            prev: None,
        },
        source,
        dest,
    }
}

/// Score a single-exon gene between a start-codon site and an in-frame
/// stop-codon site. Pays the full split penalty.
#[must_use]
pub fn score_single_exon<M: ScoringModel>(
    inputs: &ScoreInputs<'_, M>,
    mc: &ModelConfig,
    m: usize,
    start: usize,
    stop: usize,
    dir: ReqStrand,
) -> ScoredExon {
    let sites = inputs.sites;
    let model = inputs.model;
    let seq_len = sites.seq_len();

    let (exon_start, exon_stop, category, frame);
    match dir {
        ReqStrand::Forward => {
            exon_start = sites[start].pos;
            exon_stop = sites[stop].pos + 2;
            category = ExonCategory::Single(ReqStrand::Forward);
            frame = (exon_start.saturating_sub(1)) % 3;
        }
        ReqStrand::Reverse => {
            exon_start = sites[stop].pos.saturating_sub(2);
            exon_stop = sites[start].pos;
            category = ExonCategory::Single(ReqStrand::Reverse);
            frame = (seq_len - exon_stop) % 3;
        }
    }
    let len = exon_stop.saturating_sub(exon_start) + 1;

    let coding = model.coding_log_odds(m, frame, stop) - model.coding_log_odds(m, frame, start);
    let coding = blended_coding(model, m, coding, start, stop);
    let signals = splice_signals(inputs, mc, start, stop);

    let interg = model.noncoding_geometry(m, NoncodingRegion::Intergenic);
    // the intergenic exit row is shared between the strands
    let trans = interg.log_stop
        + model
            .transition(m, State::Intergenic, State::SingleExon(ReqStrand::Forward))
            .log2()
        - len as f64 * interg.log_continue;

    let codon_len = clamped_codon_len(model, m, LengthCategory::Single, len);
    let score = base_score(mc, &signals)
        + trans
        - mc.split_penalty
        + coding
        + signals.term
        + model
            .length_distribution(m, LengthCategory::Single, codon_len)
            .log2();

    ScoredExon {
        hyp: ExonHypothesis {
            start: exon_start,
            stop: exon_stop,
            category,
            left_phase: Phase::Zero,
            right_phase: Phase::Zero,
            score,
            ordinal: 1,
            prev: None,
        },
        source: CellState::Intergenic,
        dest: CellState::Intergenic,
    }
}

/// Intron row whose phase complements the exon-side remainder of a split
/// codon: the intron counts the bases already emitted upstream, so
/// remainders one and two swap.
const fn split_codon_intron_row(strand: ReqStrand, exon_phase: Phase) -> CellState {
    match exon_phase {
        Phase::Zero => CellState::Intron(strand, Phase::Zero),
        Phase::One => CellState::Intron(strand, Phase::Two),
        Phase::Two => CellState::Intron(strand, Phase::One),
    }
}

struct SpliceSignals {
    conf_start: f64,
    conf_stop: f64,
    term: f64,
}

fn splice_signals<M: ScoringModel>(
    inputs: &ScoreInputs<'_, M>,
    mc: &ModelConfig,
    start: usize,
    stop: usize,
) -> SpliceSignals {
    let conf_start = clamp_probability(inputs.model.splice_confidence(start));
    let conf_stop = clamp_probability(inputs.model.splice_confidence(stop));

    let mut term = 0.0;
    for (conf, raw) in [
        (conf_start, inputs.sites[start].score),
        (conf_stop, inputs.sites[stop].score),
    ] {
        if mc.additive_splice_terms {
            term += (conf / (1.0 - conf)).log2();
            term += mc.splice_boost * raw;
        } else if mc.splice_boost == 0.0 {
            term += (conf / (1.0 - conf)).log2();
        } else {
            term += mc.splice_boost * raw;
        }
    }

    SpliceSignals {
        conf_start,
        conf_stop,
        term,
    }
}

fn base_score(mc: &ModelConfig, signals: &SpliceSignals) -> f64 {
    if mc.use_dts {
        signals.conf_start * signals.conf_stop * mc.exon_boost
    } else {
        mc.exon_boost
    }
}

fn blended_coding<M: ScoringModel>(
    model: &M,
    m: usize,
    coding: f64,
    start: usize,
    stop: usize,
) -> f64 {
    match model.signal_peptide(m, start, stop) {
        Some(alt) => (SIGNAL_ALT_WEIGHT * alt * alt + SIGNAL_CODING_WEIGHT * coding * coding).log2(),
        None => coding,
    }
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR)
}

fn clamped_codon_len<M: ScoringModel>(
    model: &M,
    m: usize,
    category: LengthCategory,
    len: usize,
) -> usize {
    let buckets = model.length_buckets(m, category);
    (len / 3).min(buckets.saturating_sub(1))
}
