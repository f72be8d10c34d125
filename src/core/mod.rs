//! Core data types for transcript feature trees.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Coords`], [`Strand`]: half-open coordinate ranges on named sequences
//! - [`SpliceMotif`], [`Spliceosome`]: splice-junction classification
//! - [`TransFeature`] and its sub-feature variants: the typed feature tree
//! - [`TranscriptFeatures`]: the per-record tree root
//! - [`GeneAnnotation`]: transcripts grouped by gene
//!
//! ## Coordinate conventions
//!
//! All ranges are half-open (`start <= end`). Trees are stored in
//! "+"-chromosome orientation; for reverse-strand transcripts the RNA
//! coordinates run on the reverse RNA strand so that both coordinate
//! systems increase left to right. [`TranscriptFeatures::reverse_complement`]
//! mirrors a whole tree into the opposite orientation.

pub mod coords;
pub mod feature;
pub mod gene;
pub mod splice;
pub mod transcript;

pub use coords::{Coords, MissingSizeError, Strand};
pub use feature::{AlignFeature, AnnotFeature, Exon, Frame, Intron, SubFeatures, TransFeature};
pub use gene::GeneAnnotation;
pub use splice::{SpliceMotif, Spliceosome};
pub use transcript::TranscriptFeatures;
