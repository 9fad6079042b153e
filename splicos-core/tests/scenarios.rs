//! End-to-end decoding scenarios over synthetic windows.

mod common;

use bio::bio_types::strand::ReqStrand;
use common::{fsite, rsite, TableModel};
use splicos_core::algorithms::dynamic_programming::junction::junction_has_stop;
use splicos_core::{
    decode_windows, CellState, Decoder, DecoderConfig, ExonCategory, Phase, SiteIndex, SiteKind,
    SplicosError, StopCodonPolicy,
};

/// One forward gene: ATG at 50, donor at 140, acceptor motif ending at
/// 199, stop codon at 260. Coding mass rises across both exons and falls
/// through the intron.
fn spliced_window() -> (SiteIndex, Vec<u8>, TableModel) {
    let forward = vec![
        fsite(SiteKind::Start, 50, 1.0),
        fsite(SiteKind::Donor, 140, 2.0),
        fsite(SiteKind::Acceptor, 198, 2.0),
        fsite(SiteKind::Stop, 260, 3.0),
    ];
    let sites = SiteIndex::merge(forward, Vec::new(), 300).unwrap();
    let seq = vec![b'c'; 300];
    let model = TableModel::new(sites.len()).with_coding(vec![0.0, 0.0, 30.0, 10.0, 30.0, 30.0]);
    (sites, seq, model)
}

fn complete_gene_config() -> DecoderConfig {
    DecoderConfig {
        force_complete_genes: true,
        ..Default::default()
    }
}

#[test]
fn single_spliced_gene_is_reported() {
    let (sites, seq, model) = spliced_window();
    let decoder = Decoder::new(complete_gene_config(), &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    let ends = decoded.ranked();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].state, CellState::Intergenic);
    assert!(ends[0].score > 0.0);

    let genes = decoded.genes(&ends[0]);
    assert_eq!(genes.len(), 1);
    let exons = &genes[0].exons;
    assert_eq!(exons.len(), 2);

    assert_eq!(exons[0].start, 50);
    assert_eq!(exons[0].stop, 139);
    assert_eq!(
        exons[0].category,
        ExonCategory::Initial(ReqStrand::Forward)
    );

    assert_eq!(exons[1].start, 200);
    assert_eq!(exons[1].stop, 262);
    assert_eq!(
        exons[1].category,
        ExonCategory::Terminal(ReqStrand::Forward)
    );

    assert!(genes[0].coding_len() >= 100);
}

#[test]
fn minimum_gene_length_prunes_every_candidate() {
    let (sites, seq, model) = spliced_window();
    let config = DecoderConfig {
        min_gene_length: 500,
        ..complete_gene_config()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    let ends = decoded.ranked();
    assert_eq!(ends.len(), 1);
    assert!(decoded.genes(&ends[0]).is_empty());
}

#[test]
fn reported_genes_respect_the_minimum_length() {
    let (sites, seq, model) = spliced_window();
    let config = complete_gene_config();
    let min = config.min_gene_length;
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    for end in decoded.ranked() {
        for gene in decoded.genes(&end) {
            assert!(gene.coding_len() > min);
        }
    }
}

#[test]
fn competing_starts_fill_two_ranks_with_distinct_scores() {
    let forward = vec![
        fsite(SiteKind::Start, 50, 1.0),
        fsite(SiteKind::Start, 56, 1.5),
        fsite(SiteKind::Donor, 140, 2.0),
    ];
    let sites = SiteIndex::merge(forward, Vec::new(), 300).unwrap();
    let seq = vec![b'c'; 300];
    let model = TableModel::new(sites.len()).with_coding(vec![0.0, 0.0, 3.0, 30.0, 30.0]);
    let config = DecoderConfig {
        top_predictions: 2,
        ..complete_gene_config()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    let i0 = CellState::Intron(ReqStrand::Forward, Phase::Zero);
    let donor_slot = 3;
    let top = decoded.cells().entry(i0, donor_slot, 0);
    let second = decoded.cells().entry(i0, donor_slot, 1);

    assert!(top.is_occupied());
    assert!(second.is_occupied());
    assert!(top.score > second.score);

    let top_hyp = decoded.hypotheses().get(top.hyp.unwrap());
    let second_hyp = decoded.hypotheses().get(second.hyp.unwrap());
    assert_eq!(top_hyp.start, 50);
    assert_eq!(second_hyp.start, 56);
    assert_eq!(top_hyp.stop, 139);
    assert_eq!(second_hyp.stop, 139);
}

#[test]
fn boundary_only_window_is_a_pure_copy_of_the_initial_condition() {
    let sites = SiteIndex::merge(Vec::new(), Vec::new(), 300).unwrap();
    let seq = vec![b'c'; 300];
    let model = TableModel::new(sites.len());
    let config = DecoderConfig {
        top_predictions: 2,
        ..Default::default()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    for state in CellState::ALL {
        for rank in 0..2 {
            let at_start = decoded.cells().entry(state, 0, rank);
            let at_end = decoded.cells().entry(state, 1, rank);
            assert_eq!(at_start.score.to_bits(), at_end.score.to_bits());
            assert_eq!(at_start.hyp, at_end.hyp);
        }
    }
    assert!(decoded.hypotheses().is_empty());
}

#[test]
fn repeated_runs_are_bit_identical() {
    let (sites, seq, model) = spliced_window();
    let config = DecoderConfig {
        top_predictions: 3,
        ..complete_gene_config()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let first = decoder.run();
    let second = decoder.run();

    for state in CellState::ALL {
        for site in 0..sites.len() {
            for rank in 0..3 {
                let a = first.cells().entry(state, site, rank);
                let b = second.cells().entry(state, site, rank);
                assert_eq!(a.score.to_bits(), b.score.to_bits());
                assert_eq!(a.hyp.is_some(), b.hyp.is_some());
            }
        }
    }
    assert_eq!(first.ranked(), second.ranked());
}

#[test]
fn cell_scores_stay_sorted_and_distinct() {
    let forward = vec![
        fsite(SiteKind::Start, 50, 1.0),
        fsite(SiteKind::Start, 56, 1.5),
        fsite(SiteKind::Donor, 140, 2.0),
        fsite(SiteKind::Acceptor, 198, 2.0),
        fsite(SiteKind::Stop, 260, 3.0),
    ];
    let sites = SiteIndex::merge(forward, Vec::new(), 300).unwrap();
    let seq = vec![b'c'; 300];
    let model = TableModel::new(sites.len()).with_coding(vec![0.0, 0.0, 1.0, 30.0, 10.0, 30.0, 30.0]);
    let config = DecoderConfig {
        top_predictions: 3,
        ..complete_gene_config()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    for state in CellState::ALL {
        for site in 0..sites.len() {
            let mut prev: Option<f64> = None;
            for rank in 0..3 {
                let entry = decoded.cells().entry(state, site, rank);
                if let Some(p) = prev {
                    assert!(
                        entry.score <= p,
                        "rank order violated at {state:?} site {site}"
                    );
                    if entry.is_occupied() {
                        assert!(
                            entry.score < p,
                            "duplicate score at {state:?} site {site} rank {rank}"
                        );
                    }
                }
                if entry.is_occupied() {
                    prev = Some(entry.score);
                }
            }
        }
    }
}

#[test]
fn junction_stop_codon_discards_the_spliced_parse() {
    let forward = vec![
        fsite(SiteKind::Start, 50, 1.0),
        fsite(SiteKind::Donor, 141, 2.0),
        fsite(SiteKind::Acceptor, 198, 2.0),
        fsite(SiteKind::Stop, 259, 3.0),
    ];
    let sites = SiteIndex::merge(forward, Vec::new(), 300).unwrap();
    // the codon split across the intron reads t|ga
    let mut seq = vec![b'c'; 300];
    seq[139] = b't';
    seq[199] = b'g';
    seq[200] = b'a';
    let model = TableModel::new(sites.len()).with_coding(vec![0.0, 0.0, 30.0, 10.0, 30.0, 30.0]);

    let blocked = Decoder::new(complete_gene_config(), &sites, &seq, &model)
        .unwrap()
        .run();
    let ends = blocked.ranked();
    assert!(blocked.genes(&ends[0]).is_empty());

    // under a TAA-only policy the split TGA is not a stop and the gene
    // survives
    let config = DecoderConfig {
        stop_codon_policy: StopCodonPolicy::OnlyTaa,
        ..complete_gene_config()
    };
    let kept = Decoder::new(config, &sites, &seq, &model).unwrap().run();
    let ends = kept.ranked();
    let genes = kept.genes(&ends[0]);
    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].exons.len(), 2);
    assert_eq!(genes[0].exons[0].stop, 140);
    assert_eq!(genes[0].exons[1].start, 200);

    // the reported junction is clean under the active policy
    for pair in genes[0].exons.windows(2) {
        assert!(!junction_has_stop(
            &seq,
            StopCodonPolicy::OnlyTaa,
            ReqStrand::Forward,
            pair[1].left_phase,
            pair[0].stop,
            pair[1].start,
        ));
    }
}

#[test]
fn reverse_single_exon_gene_is_reported() {
    let reverse = vec![
        rsite(SiteKind::Stop, 40, 2.0),
        rsite(SiteKind::Start, 259, 1.0),
    ];
    let sites = SiteIndex::merge(Vec::new(), reverse, 300).unwrap();
    let seq = vec![b'c'; 300];
    let model = TableModel::new(sites.len()).with_coding(vec![0.0, 25.0, 0.0, 0.0]);
    let decoder = Decoder::new(complete_gene_config(), &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    let ends = decoded.ranked();
    let genes = decoded.genes(&ends[0]);
    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].exons.len(), 1);
    let exon = genes[0].exons[0];
    assert_eq!(exon.start, 38);
    assert_eq!(exon.stop, 259);
    assert_eq!(exon.category, ExonCategory::Single(ReqStrand::Reverse));
}

#[test]
fn short_intergenic_gap_walk_adopts_the_earlier_anchor() {
    let forward = vec![
        fsite(SiteKind::Start, 21, 1.0),
        fsite(SiteKind::Stop, 81, 2.0),
        fsite(SiteKind::Start, 90, 1.0),
        fsite(SiteKind::Stop, 150, 2.0),
    ];
    let sites = SiteIndex::merge(forward, Vec::new(), 300).unwrap();
    let seq = vec![b'c'; 300];
    let model =
        TableModel::new(sites.len()).with_coding(vec![0.0, 0.0, 20.0, 20.0, 60.0, 60.0]);

    let run_with = |gap: usize, penalty: f64| {
        let mut config = DecoderConfig {
            min_gene_length: 10,
            ..complete_gene_config()
        };
        config.models[0].intergenic_gap = gap;
        config.models[0].intergenic_gap_penalty = penalty;
        let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
        let decoded = decoder.run();
        let ends = decoded.ranked();
        decoded.genes(&ends[0]).len()
    };

    // without the walk both single-exon genes chain up
    assert_eq!(run_with(0, 0.0), 2);
    // zero hysteresis keeps the higher-scoring chained parse
    assert_eq!(run_with(10, 0.0), 2);
    // a large hysteresis makes the walk adopt the gap-free anchor,
    // dropping the upstream gene from the parse
    assert_eq!(run_with(10, 100.0), 1);
}

#[test]
fn forced_windows_only_report_intergenic_ends() {
    let (sites, seq, model) = spliced_window();
    let config = DecoderConfig {
        top_predictions: 4,
        ..complete_gene_config()
    };
    let decoder = Decoder::new(config, &sites, &seq, &model).unwrap();
    let decoded = decoder.run();
    for end in decoded.ranked() {
        assert_eq!(end.state, CellState::Intergenic);
    }
}

#[test]
fn batch_decoding_matches_input_order() {
    let (sites_a, seq_a, _) = spliced_window();
    let sites_b = SiteIndex::merge(Vec::new(), Vec::new(), 300).unwrap();
    let seq_b = vec![b'c'; 300];
    let model = TableModel::new(sites_a.len()).with_coding(vec![0.0, 0.0, 30.0, 10.0, 30.0, 30.0]);

    let windows: Vec<(&SiteIndex, &[u8])> =
        vec![(&sites_a, seq_a.as_slice()), (&sites_b, seq_b.as_slice())];
    let decoded = decode_windows(&complete_gene_config(), &windows, &model).unwrap();
    assert_eq!(decoded.len(), 2);

    let ends = decoded[0].ranked();
    assert_eq!(decoded[0].genes(&ends[0]).len(), 1);
    let ends = decoded[1].ranked();
    assert!(decoded[1].genes(&ends[0]).is_empty());
}

#[test]
fn rank_queries_are_bounds_checked() {
    let (sites, seq, model) = spliced_window();
    let decoder = Decoder::new(complete_gene_config(), &sites, &seq, &model).unwrap();
    let decoded = decoder.run();

    assert!(decoded.best(CellState::Intergenic, 0).is_ok());
    assert!(matches!(
        decoded.best(CellState::Intergenic, 5),
        Err(SplicosError::RankOutOfRange(5, 1))
    ));
}
