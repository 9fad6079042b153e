//! Shared fixtures: a table-backed scoring model and site builders.

use bio::bio_types::strand::Strand;
use splicos_core::{
    LengthCategory, NoncodingGeometry, NoncodingRegion, ScoringModel, Site, SiteKind, State,
};

/// Scoring tables held in plain vectors, indexed by site slot. Coding
/// log-odds are shared across frames, which is enough for windows whose
/// candidates agree on the reading frame.
pub struct TableModel {
    pub coding: Vec<f64>,
    pub confidence: Vec<f64>,
    pub length_prob: f64,
    pub length_buckets: usize,
    pub transition_prob: f64,
    pub intron: NoncodingGeometry,
    pub intergenic: NoncodingGeometry,
}

impl TableModel {
    /// Uniform tables over `n_sites` slots: confident sites, flat
    /// transitions, megabase-scale intergenic regions and short introns.
    pub fn new(n_sites: usize) -> Self {
        Self {
            coding: vec![0.0; n_sites],
            confidence: vec![0.99; n_sites],
            length_prob: 0.01,
            length_buckets: 1000,
            transition_prob: 0.25,
            intron: geometry(100.0),
            intergenic: geometry(1000.0),
        }
    }

    pub fn with_coding(mut self, coding: Vec<f64>) -> Self {
        self.coding = coding;
        self
    }
}

fn geometry(mean_len: f64) -> NoncodingGeometry {
    NoncodingGeometry {
        log_stop: (1.0 / (mean_len + 1.0)).log2(),
        log_continue: (mean_len / (mean_len + 1.0)).log2(),
    }
}

impl ScoringModel for TableModel {
    fn coding_log_odds(&self, _model: usize, _frame: usize, site: usize) -> f64 {
        self.coding.get(site).copied().unwrap_or(0.0)
    }

    fn splice_confidence(&self, site: usize) -> f64 {
        self.confidence.get(site).copied().unwrap_or(0.5)
    }

    fn length_distribution(&self, _model: usize, _c: LengthCategory, _len: usize) -> f64 {
        self.length_prob
    }

    fn length_buckets(&self, _model: usize, _c: LengthCategory) -> usize {
        self.length_buckets
    }

    fn noncoding_geometry(&self, _model: usize, region: NoncodingRegion) -> NoncodingGeometry {
        match region {
            NoncodingRegion::Intron => self.intron,
            NoncodingRegion::Intergenic => self.intergenic,
        }
    }

    fn transition(&self, _model: usize, _from: State, _to: State) -> f64 {
        self.transition_prob
    }
}

pub fn fsite(kind: SiteKind, pos: usize, score: f64) -> Site {
    Site {
        kind,
        strand: Strand::Forward,
        pos,
        score,
    }
}

pub fn rsite(kind: SiteKind, pos: usize, score: f64) -> Site {
    Site {
        kind,
        strand: Strand::Reverse,
        pos,
        score,
    }
}
