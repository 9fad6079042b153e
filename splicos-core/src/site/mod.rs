//! The ordered index of candidate sites a decoding run walks.
//!
//! Detectors scan each strand independently and hand over one
//! position-ascending list per strand. [`SiteIndex::merge`] interleaves the
//! two by genomic coordinate and caps the result with synthetic boundary
//! sentinels, producing the immutable index the sweep iterates.

use std::ops::Index;

use bio::bio_types::strand::Strand;

use crate::constants::NO_SCORE;
use crate::types::{Site, SiteKind, SplicosError};

/// Immutable, position-ordered sequence of candidate sites for one window.
///
/// Index 0 and the last index always hold boundary sentinels at positions
/// `0` and `seq_len + 1`; every real site lies strictly between them.
#[derive(Debug, Clone)]
pub struct SiteIndex {
    sites: Vec<Site>,
    seq_len: usize,
}

impl SiteIndex {
    /// Merge per-strand candidate lists into one ordered index.
    ///
    /// Both lists must be strictly ascending by position, carry only their
    /// own strand, and stay within `1..=seq_len`. Forward sites sort before
    /// reverse sites at equal positions.
    ///
    /// # Errors
    ///
    /// Returns a [`SplicosError`] naming the first offending entry when a
    /// list is unsorted, out of range, mislabeled, or contains a boundary
    /// sentinel.
    pub fn merge(
        forward: Vec<Site>,
        reverse: Vec<Site>,
        seq_len: usize,
    ) -> Result<Self, SplicosError> {
        validate_strand_list(&forward, Strand::Forward, seq_len)?;
        validate_strand_list(&reverse, Strand::Reverse, seq_len)?;

        let mut sites = Vec::with_capacity(forward.len() + reverse.len() + 2);
        sites.push(Site {
            kind: SiteKind::Boundary,
            strand: Strand::Unknown,
            pos: 0,
            score: NO_SCORE,
        });

        let mut fwd = forward.into_iter().peekable();
        let mut rev = reverse.into_iter().peekable();
        loop {
            let take_forward = match (fwd.peek(), rev.peek()) {
                (Some(f), Some(r)) => f.pos <= r.pos,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_forward { fwd.next() } else { rev.next() };
            if let Some(site) = next {
                sites.push(site);
            }
        }

        sites.push(Site {
            kind: SiteKind::Boundary,
            strand: Strand::Unknown,
            pos: seq_len + 1,
            score: NO_SCORE,
        });

        Ok(Self { sites, seq_len })
    }

    /// Number of index slots, sentinels included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// A merged index always carries its two sentinels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the trailing boundary sentinel.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.sites.len() - 1
    }

    /// Length of the sequence window this index was built for.
    #[must_use]
    pub const fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Site at the given index slot, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    /// Iterate over all sites in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }
}

impl Index<usize> for SiteIndex {
    type Output = Site;

    fn index(&self, index: usize) -> &Site {
        &self.sites[index]
    }
}

fn validate_strand_list(
    sites: &[Site],
    strand: Strand,
    seq_len: usize,
) -> Result<(), SplicosError> {
    let mut last_pos = 0usize;
    for (i, site) in sites.iter().enumerate() {
        if site.kind == SiteKind::Boundary {
            return Err(SplicosError::BoundaryInInput(i));
        }
        if site.strand != strand {
            return Err(SplicosError::StrandMismatch(i));
        }
        if site.pos < 1 || site.pos > seq_len {
            return Err(SplicosError::SitePositionOutOfRange(site.pos, seq_len));
        }
        if i > 0 && site.pos <= last_pos {
            return Err(SplicosError::UnsortedSites(i));
        }
        last_pos = site.pos;
    }
    Ok(())
}
