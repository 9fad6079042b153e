/// Version string for Splicos
pub const VERSION: &str = "0.1.0";

/// Number of reading frames per strand
pub const READING_FRAMES: usize = 3;

/// Length of a codon in base pairs
pub const CODON_LENGTH: usize = 3;

/// Number of grammar states in the gene model
pub const GRAMMAR_STATES: usize = 19;

/// Number of noncoding states that own dynamic-programming cells
/// (intergenic plus three intron phases per strand)
pub const NONCODING_STATES: usize = 7;

/// Number of per-frame stop-codon cursors (three frames on each strand)
pub const STOP_CURSORS: usize = 6;

/// Sentinel score carried by candidate sites whose detector score fell
/// below threshold, and by the boundary sentinels
pub const NO_SCORE: f64 = -99.0;

/// Score of an unoccupied or unreachable cell rank
pub const UNREACHABLE_SCORE: f64 = f64::NEG_INFINITY;

/// Degenerate classifier probabilities are clamped to
/// `[PROBABILITY_FLOOR, 1 - PROBABILITY_FLOOR]` before odds are taken
pub const PROBABILITY_FLOOR: f64 = 1e-6;

/// Weight of the signal-peptide-aware score in the blended coding term
pub const SIGNAL_ALT_WEIGHT: f64 = 0.2;

/// Weight of the plain coding score in the blended coding term
pub const SIGNAL_CODING_WEIGHT: f64 = 0.8;

/// Default minimum cumulative coding length of a reported gene
pub const DEFAULT_MIN_GENE_LENGTH: usize = 100;

/// Default flat score added to every candidate exon
pub const DEFAULT_EXON_BOOST: f64 = 5.0;
