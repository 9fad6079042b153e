//! The left-to-right N-best sweep over the site index.
//!
//! Position `i` first inherits every state's ranked parses from position
//! `i - 1`, then the site's kind dispatches to one of four event branches:
//! forward stop codons close single and terminal exons into the intergenic
//! state, forward donors open initial exons and extend internal exons into
//! the forward intron states, reverse start codons close reverse genes, and
//! reverse acceptors extend reverse parses into the reverse intron states.
//! Each branch searches backward for compatible earlier sites, bounded by
//! the most recent in-frame stop codon.

use bio::bio_types::strand::{ReqStrand, Strand};
use log::trace;

use crate::algorithms::dynamic_programming::junction::{
    gene_length_ok, junction_has_stop, next_ordinal,
};
use crate::algorithms::dynamic_programming::nbest::{CellEntry, CellRef, CellTable, HypothesisArena};
use crate::config::{DecoderConfig, ModelConfig};
use crate::constants::STOP_CURSORS;
use crate::scoring::exon::{
    score_initial_exon, score_internal_exon, score_single_exon, score_terminal_exon, ScoreInputs,
    ScoredExon,
};
use crate::scoring::model::{NoncodingRegion, ScoringModel};
use crate::site::SiteIndex;
use crate::types::{CellState, Phase, SiteKind};

/// Exon-count adjustment a chained candidate applies to its path score.
#[derive(Debug, Clone, Copy)]
enum CountAdjust {
    /// One more internal exon: telescoping tail ratio
    Telescope,
    /// Closing a gene at its current exon count
    CloseGene,
}

#[derive(Debug, Clone, Copy)]
struct ChainOptions {
    /// Strand the split-codon junction filter reads
    junction_strand: ReqStrand,
    /// Apply the minimum-gene-length rule before inserting
    length_check: bool,
    /// Exon-count adjustment under the correction flag
    count: CountAdjust,
    /// Discard candidates with no committed predecessor
    require_prev: bool,
}

pub(crate) struct Sweep<'a, M: ScoringModel> {
    config: &'a DecoderConfig,
    sites: &'a SiteIndex,
    seq: &'a [u8],
    model: &'a M,
    table: CellTable,
    arena: HypothesisArena,
    last_stop: [usize; STOP_CURSORS],
}

/// Run the dynamic program and return the filled cell table together with
/// the arena owning every surviving hypothesis chain.
pub(crate) fn run_sweep<M: ScoringModel>(
    config: &DecoderConfig,
    sites: &SiteIndex,
    seq: &[u8],
    model: &M,
) -> (CellTable, HypothesisArena) {
    let mut sweep = Sweep {
        config,
        sites,
        seq,
        model,
        table: CellTable::new(config.top_predictions, sites.len()),
        arena: HypothesisArena::new(),
        last_stop: [0; STOP_CURSORS],
    };
    sweep.init();
    sweep.run();
    (sweep.table, sweep.arena)
}

impl<'a, M: ScoringModel> Sweep<'a, M> {
    fn origin() -> CellRef {
        CellRef {
            state: CellState::Intergenic,
            site: 0,
            rank: 0,
        }
    }

    fn inputs(&self) -> ScoreInputs<'a, M> {
        ScoreInputs {
            sites: self.sites,
            model: self.model,
        }
    }

    /// Initial conditions at the leading boundary sentinel: the window
    /// starts intergenic at even odds, or mid-intron at the configured
    /// prior. Every other rank stays unreachable.
    fn init(&mut self) {
        self.table.set(
            CellState::Intergenic,
            0,
            0,
            CellEntry {
                score: 0.0,
                hyp: None,
                prev: Self::origin(),
            },
        );
        if !self.config.force_complete_genes {
            for strand in [ReqStrand::Forward, ReqStrand::Reverse] {
                for phase in Phase::ALL {
                    let weight = self.config.intron_phase_weights[phase.index()];
                    let score =
                        0.5 * (self.config.intron_start_odds.log2() + (3.0 * weight).log2());
                    self.table.set(
                        CellState::Intron(strand, phase),
                        0,
                        0,
                        CellEntry {
                            score,
                            hyp: None,
                            prev: Self::origin(),
                        },
                    );
                }
            }
        }
    }

    fn run(&mut self) {
        let force = self.config.force_complete_genes;
        for i in 1..=self.sites.last_index() {
            self.table.copy_forward(i);
            let site = self.sites[i];

            if site.kind == SiteKind::Stop && site.strand == Strand::Forward {
                if site.score >= self.config.stop_score_threshold {
                    self.forward_stop_event(i);
                }
                self.last_stop[(site.pos - 1) % 3] = i;
            }

            if (!force && site.kind == SiteKind::Boundary)
                || (site.kind == SiteKind::Donor && site.strand == Strand::Forward)
            {
                self.forward_donor_event(i);
            }

            if site.kind == SiteKind::Stop && site.strand == Strand::Reverse {
                self.last_stop[3 + site.pos % 3] = i;
            }

            if site.kind == SiteKind::Start && site.strand == Strand::Reverse {
                self.reverse_start_event(i);
            }

            if (!force && site.kind == SiteKind::Boundary)
                || (site.kind == SiteKind::Acceptor && site.strand == Strand::Reverse)
            {
                self.reverse_acceptor_event(i);
            }
        }
    }

    /// A forward stop codon closes single-exon genes started at an
    /// in-frame start codon and terminal exons started at a forward
    /// acceptor (or open at the window boundary).
    fn forward_stop_event(&mut self, i: usize) {
        let config = self.config;
        let site = self.sites[i];
        trace!("site {i} (pos {}): forward stop event", site.pos);

        let floor = self.last_stop[(site.pos - 1) % 3];
        for j in (floor..i).rev() {
            let sj = self.sites[j];

            if sj.kind == SiteKind::Start
                && sj.strand == Strand::Forward
                && sj.pos % 3 == site.pos % 3
                && site.pos - sj.pos + 3 > config.min_gene_length
            {
                for (m, mc) in config.models.iter().enumerate() {
                    let template =
                        score_single_exon(&self.inputs(), mc, m, j, i, ReqStrand::Forward);
                    self.chain_from_intergenic(i, j, mc, &template, false);
                }
            }

            if (!config.force_complete_genes && sj.kind == SiteKind::Boundary)
                || (sj.kind == SiteKind::Acceptor && sj.strand == Strand::Forward)
            {
                for (m, mc) in config.models.iter().enumerate() {
                    let template =
                        score_terminal_exon(&self.inputs(), mc, m, j, i, ReqStrand::Forward);
                    self.chain_spliced(
                        i,
                        j,
                        m,
                        mc,
                        &template,
                        ChainOptions {
                            junction_strand: ReqStrand::Forward,
                            length_check: true,
                            count: CountAdjust::CloseGene,
                            require_prev: false,
                        },
                    );
                }
            }
        }
    }

    /// A forward donor opens an initial exon from an in-frame start codon
    /// or extends an internal exon from a forward acceptor, entering the
    /// intron phase the search is running for.
    fn forward_donor_event(&mut self, i: usize) {
        let config = self.config;
        let site = self.sites[i];
        trace!("site {i} (pos {}): forward donor event", site.pos);

        for rphase in Phase::ALL {
            let r = rphase.index() as i64;
            let slot = ((site.pos as i64 - r - 1).rem_euclid(3)) as usize;
            let floor = self.last_stop[slot].max(1);
            for j in (floor..i).rev() {
                let sj = self.sites[j];

                if sj.kind == SiteKind::Start
                    && sj.strand == Strand::Forward
                    && sj.pos as i64 <= site.pos as i64 - 3 - r
                    && (sj.pos as i64 + 2).rem_euclid(3)
                        == (site.pos as i64 - r - 1).rem_euclid(3)
                {
                    for (m, mc) in config.models.iter().enumerate() {
                        let template =
                            score_initial_exon(&self.inputs(), mc, m, j, i, ReqStrand::Forward);
                        self.chain_from_intergenic(i, j, mc, &template, true);
                    }
                }

                if (!config.force_complete_genes && sj.kind == SiteKind::Boundary)
                    || (sj.kind == SiteKind::Acceptor
                        && sj.strand == Strand::Forward
                        && sj.pos as i64 + 2 < site.pos as i64 - r - 1)
                {
                    for (m, mc) in config.models.iter().enumerate() {
                        let template = score_internal_exon(
                            &self.inputs(),
                            mc,
                            m,
                            j,
                            i,
                            rphase,
                            ReqStrand::Forward,
                        );
                        self.chain_spliced(
                            i,
                            j,
                            m,
                            mc,
                            &template,
                            ChainOptions {
                                junction_strand: ReqStrand::Forward,
                                length_check: false,
                                count: CountAdjust::Telescope,
                                require_prev: !mc.allow_partial_internal,
                            },
                        );
                    }
                }
            }
        }
    }

    /// A reverse start codon closes a reverse gene: a single exon back to
    /// the most recent in-frame reverse stop, or an initial exon back to a
    /// reverse donor.
    fn reverse_start_event(&mut self, i: usize) {
        let config = self.config;
        let site = self.sites[i];
        trace!("site {i} (pos {}): reverse start event", site.pos);

        let j = self.last_stop[3 + site.pos % 3];
        if j >= 1
            && self.sites[j].score >= config.stop_score_threshold
            && (self.sites[j].pos as i64) < site.pos as i64 - 2
            && site.pos as i64 - self.sites[j].pos as i64 + 3 > config.min_gene_length as i64
        {
            for (m, mc) in config.models.iter().enumerate() {
                let template = score_single_exon(&self.inputs(), mc, m, i, j, ReqStrand::Reverse);
                self.chain_from_intergenic(i, j, mc, &template, false);
            }
        }

        let floor = j + 1;
        for j2 in (floor..i).rev() {
            let sj = self.sites[j2];
            if (!config.force_complete_genes && sj.kind == SiteKind::Boundary)
                || (sj.kind == SiteKind::Donor
                    && sj.strand == Strand::Reverse
                    && (sj.pos as i64) < site.pos as i64 - 2)
            {
                for (m, mc) in config.models.iter().enumerate() {
                    let template =
                        score_initial_exon(&self.inputs(), mc, m, i, j2, ReqStrand::Reverse);
                    self.chain_spliced(
                        i,
                        j2,
                        m,
                        mc,
                        &template,
                        ChainOptions {
                            junction_strand: ReqStrand::Reverse,
                            length_check: true,
                            count: CountAdjust::CloseGene,
                            require_prev: false,
                        },
                    );
                }
            }
        }
    }

    /// A reverse acceptor opens a reverse terminal exon against the most
    /// recent in-frame reverse stop, or extends a reverse internal exon
    /// from an earlier reverse donor.
    fn reverse_acceptor_event(&mut self, i: usize) {
        let config = self.config;
        let site = self.sites[i];
        trace!("site {i} (pos {}): reverse acceptor event", site.pos);

        for rphase in Phase::ALL {
            let r = rphase.index() as i64;
            let slot = 3 + ((site.pos as i64 - 2 - r).rem_euclid(3)) as usize;
            let this_stop = self.last_stop[slot];

            if this_stop >= 1 && self.sites[this_stop].score >= config.stop_score_threshold {
                for (m, mc) in config.models.iter().enumerate() {
                    let template =
                        score_terminal_exon(&self.inputs(), mc, m, i, this_stop, ReqStrand::Reverse);
                    self.chain_from_intergenic(i, this_stop, mc, &template, true);
                }
            }

            for j in (this_stop..i).rev() {
                let sj = self.sites[j];
                let open_at_window_start =
                    j == 0 && site.pos > 2 && !config.force_complete_genes;
                if open_at_window_start
                    || (sj.kind == SiteKind::Donor
                        && sj.strand == Strand::Reverse
                        && sj.pos as i64 <= site.pos as i64 - 3 - r)
                {
                    for (m, mc) in config.models.iter().enumerate() {
                        let template = score_internal_exon(
                            &self.inputs(),
                            mc,
                            m,
                            i,
                            j,
                            rphase,
                            ReqStrand::Reverse,
                        );
                        self.chain_spliced(
                            i,
                            j,
                            m,
                            mc,
                            &template,
                            ChainOptions {
                                junction_strand: ReqStrand::Reverse,
                                length_check: false,
                                count: CountAdjust::Telescope,
                                require_prev: !mc.allow_partial_internal,
                            },
                        );
                    }
                }
            }
        }
    }

    /// Chain a candidate whose predecessors live in the intergenic row:
    /// single exons, forward initial exons, reverse terminal exons.
    ///
    /// When a gap allowance is configured, the anchor walks back over
    /// intergenic predecessors separated by at most that many bases; the
    /// earlier anchor is adopted when it beats the stay-put score reduced
    /// by the configured hysteresis.
    fn chain_from_intergenic(
        &mut self,
        i: usize,
        j: usize,
        mc: &ModelConfig,
        template: &ScoredExon,
        enter_gene: bool,
    ) {
        for rank in 0..self.table.k() {
            let src = *self.table.entry(CellState::Intergenic, j, rank);
            let mut hyp = template.hyp.clone();
            hyp.prev = src.hyp;
            let mut score = hyp.score + src.score;
            let mut anchor = j;

            if mc.intergenic_gap > 0 {
                let mut h = j;
                while h > 0 {
                    let entry = self.table.entry(CellState::Intergenic, h, rank);
                    let Some(id) = entry.hyp else { break };
                    let gap = hyp.start as i64 - self.arena.get(id).stop as i64 - 1;
                    if gap <= mc.intergenic_gap as i64 {
                        h -= 1;
                    } else {
                        break;
                    }
                }
                if h < j {
                    let alt_entry = *self.table.entry(CellState::Intergenic, h, rank);
                    let alt = hyp.score + alt_entry.score;
                    if score - mc.intergenic_gap_penalty < alt {
                        hyp.prev = alt_entry.hyp;
                        score = alt;
                        anchor = h;
                    }
                }
            }

            if enter_gene && self.config.use_exon_count_correction {
                score += self.model.exon_count_tail(2).log2();
            }

            let prev = CellRef {
                state: CellState::Intergenic,
                site: anchor,
                rank,
            };
            self.table
                .insert(template.dest, i, score, hyp, &mut self.arena, prev);
        }
    }

    /// Chain a candidate whose predecessors live in an intron row:
    /// terminal, internal, and reverse initial exons. Applies the
    /// split-codon stop filter, the minimum-gene-length rule, and the
    /// intron-length correction before offering the result to the
    /// destination cell.
    fn chain_spliced(
        &mut self,
        i: usize,
        j: usize,
        m: usize,
        mc: &ModelConfig,
        template: &ScoredExon,
        opts: ChainOptions,
    ) {
        let intron = self.model.noncoding_geometry(m, NoncodingRegion::Intron);
        let interg = self.model.noncoding_geometry(m, NoncodingRegion::Intergenic);

        for rank in 0..self.table.k() {
            let src = *self.table.entry(template.source, j, rank);
            let mut hyp = template.hyp.clone();
            hyp.prev = src.hyp;

            let gap_len = if let Some(id) = src.hyp {
                let prev_hyp = self.arena.get(id);
                hyp.ordinal = next_ordinal(prev_hyp.ordinal, self.model.exon_count_cap());
                if junction_has_stop(
                    self.seq,
                    self.config.stop_codon_policy,
                    opts.junction_strand,
                    hyp.left_phase,
                    prev_hyp.stop,
                    hyp.start,
                ) {
                    continue;
                }
                1 + hyp.start as i64 - prev_hyp.stop as i64
            } else {
                if opts.require_prev {
                    continue;
                }
                hyp.start as i64 - 1
            };

            if opts.length_check {
                let origin = CellRef {
                    state: template.source,
                    site: j,
                    rank,
                };
                if !gene_length_ok(
                    &self.table,
                    &self.arena,
                    self.sites,
                    self.config.min_gene_length,
                    hyp.len(),
                    origin,
                    opts.junction_strand,
                ) {
                    continue;
                }
            }

            if mc.use_intron_length_correction {
                hyp.score += gap_len as f64 * (intron.log_continue - interg.log_continue);
            }

            let mut score = hyp.score + src.score;
            if self.config.use_exon_count_correction {
                score += match opts.count {
                    CountAdjust::Telescope => {
                        self.model.exon_count_tail(hyp.ordinal + 1).log2()
                            - self.model.exon_count_tail(hyp.ordinal).log2()
                    }
                    CountAdjust::CloseGene => -self.model.exon_count_tail(hyp.ordinal).log2(),
                };
            }

            let prev = CellRef {
                state: template.source,
                site: j,
                rank,
            };
            self.table
                .insert(template.dest, i, score, hyp, &mut self.arena, prev);
        }
    }
}
