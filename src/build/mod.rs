//! Feature tree construction.
//!
//! Converts ordered genomic↔RNA block lists into typed feature trees:
//!
//! - [`blocks::TransBlock`]: one ungapped block pairing chrom and RNA ranges
//! - [`annotation::AnnotSource`] → coding/non-coding annotation trees
//! - [`alignment::AlignSource`] → evidence trees with aligned-block/insert
//!   sub-features
//!
//! Both builders share one left-to-right pass: blocks group into exons
//! while the chromosomal gap stays below `min_intron_size`, genuine gaps
//! become introns with zero-width RNA ranges, and splice-junction motifs
//! are classified through an injected [`SeqSource`] when one is supplied.

pub mod alignment;
pub mod annotation;
pub mod blocks;

use thiserror::Error;

use crate::core::coords::MissingSizeError;
use crate::core::splice::SpliceMotif;
use crate::seq::{SeqError, SeqSource};

pub use alignment::AlignSource;
pub use annotation::AnnotSource;
pub use blocks::TransBlock;

/// Smallest chromosomal gap treated as a genuine intron; smaller gaps are
/// closed into the surrounding exon.
pub const DEFAULT_MIN_INTRON_SIZE: u64 = 30;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub min_intron_size: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            min_intron_size: DEFAULT_MIN_INTRON_SIZE,
        }
    }
}

/// Errors from feature tree construction.
///
/// `MalformedInput` is fatal for the record but recoverable at batch
/// level: callers skip and log the record rather than aborting the run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("malformed input for {id}: {reason}")]
    MalformedInput { id: String, reason: String },

    #[error(transparent)]
    MissingSize(#[from] MissingSizeError),

    #[error("sequence lookup failed: {0}")]
    Sequence(#[from] SeqError),
}

impl BuildError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        BuildError::MalformedInput {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Builds feature trees from block sources, with an optional sequence
/// capability for splice-site classification.
pub struct FeatureBuilder<'a> {
    config: BuildConfig,
    seqs: Option<&'a dyn SeqSource>,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(config: BuildConfig) -> Self {
        Self { config, seqs: None }
    }

    #[must_use]
    pub fn with_seq_source(mut self, seqs: &'a dyn SeqSource) -> Self {
        self.seqs = Some(seqs);
        self
    }

    /// Build an annotation (gene model) feature tree.
    ///
    /// # Errors
    ///
    /// `BuildError::MalformedInput` when the block list is not monotonic,
    /// the CDS lies outside the transcript, or the RNA tiling invariant
    /// fails; `BuildError::Sequence` when a supplied sequence capability
    /// fails.
    pub fn build_annotation(
        &self,
        src: &AnnotSource,
    ) -> Result<crate::core::TranscriptFeatures, BuildError> {
        annotation::build(&self.config, self.seqs, src)
    }

    /// Build an evidence (alignment) feature tree.
    ///
    /// # Errors
    ///
    /// As for [`FeatureBuilder::build_annotation`], minus the CDS checks.
    pub fn build_alignment(
        &self,
        src: &AlignSource,
    ) -> Result<crate::core::TranscriptFeatures, BuildError> {
        alignment::build(&self.config, self.seqs, src)
    }
}

/// Fetch and classify the donor/acceptor dinucleotides of an intron.
///
/// Without a sequence capability the motif is simply unknown. An error
/// from a supplied capability is fatal for the record. Stored bases are
/// upper-case iff the motif is recognized; downstream consumers key off
/// that case convention.
pub(crate) fn classify_splice_sites(
    seqs: Option<&dyn SeqSource>,
    chrom_name: &str,
    start: u64,
    end: u64,
) -> Result<(Option<String>, Option<String>, SpliceMotif), BuildError> {
    let Some(seqs) = seqs else {
        return Ok((None, None, SpliceMotif::Unknown));
    };
    if end - start < 4 {
        // Too short for distinct donor and acceptor dinucleotides.
        return Ok((None, None, SpliceMotif::Unknown));
    }
    let donor = seqs.get(chrom_name, start, start + 2, crate::core::Strand::Forward)?;
    let acceptor = seqs.get(chrom_name, end - 2, end, crate::core::Strand::Forward)?;
    let motif = SpliceMotif::classify(&donor, &acceptor);
    let (donor, acceptor) = if motif.is_known() {
        (donor.to_ascii_uppercase(), acceptor.to_ascii_uppercase())
    } else {
        (donor.to_ascii_lowercase(), acceptor.to_ascii_lowercase())
    };
    Ok((Some(donor), Some(acceptor), motif))
}
