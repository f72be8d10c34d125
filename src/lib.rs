//! # tsl-solver
//!
//! A library for evaluating how well aligned RNA evidence supports gene
//! annotations.
//!
//! Gene annotations assert an exon/intron structure; aligned cDNA and EST
//! sequences are independent observations of what was actually transcribed.
//! `tsl-solver` builds typed feature trees from both, grades each piece of
//! evidence, and reports a transcription-support verdict per transcript and
//! evidence set.
//!
//! ## Features
//!
//! - **Typed feature trees**: exons and introns with UTR/CDS or
//!   aligned-block/insert sub-features, in "+"-chromosome orientation
//! - **Splice-motif classification**: donor/acceptor dinucleotides looked
//!   up through an injected sequence source
//! - **Evidence grading**: indel-size and indel-content limits, unaligned
//!   internal RNA detection
//! - **Support evaluation**: exact, extending, and mismatching exon
//!   structures with signed terminal offsets
//! - **Aggregation**: per-verdict summaries across whole evidence sets
//!
//! ## Example
//!
//! ```rust,no_run
//! use tsl_solver::build::{BuildConfig, FeatureBuilder};
//! use tsl_solver::parsing::{parse_genepred_file, parse_psl_file};
//! use tsl_solver::support::{evaluate_transcript_support, EvalConfig, IgnoreSet};
//! use std::path::Path;
//!
//! let builder = FeatureBuilder::new(BuildConfig::default());
//!
//! let annots = parse_genepred_file(Path::new("annots.gp")).unwrap();
//! let annot = builder.build_annotation(&annots[0]).unwrap();
//!
//! let evidence: Vec<_> = parse_psl_file(Path::new("mrna.psl"))
//!     .unwrap()
//!     .iter()
//!     .map(|src| builder.build_alignment(src).unwrap())
//!     .collect();
//!
//! if let Some(result) = evaluate_transcript_support(
//!     &annot,
//!     "mrnas",
//!     &evidence,
//!     &EvalConfig::default(),
//!     &IgnoreSet::new(),
//! ) {
//!     for summary in &result.summaries {
//!         println!("{}: {} ({})", summary.transcript_id, summary.support, summary.evid_count);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Coordinates, strands, feature trees, and splice motifs
//! - [`build`]: Feature tree construction from block lists
//! - [`seq`]: Sequence access capability (in-memory, cached, FASTA)
//! - [`support`]: Evidence grading, evaluation, and aggregation
//! - [`parsing`]: genePred and PSL parsers
//! - [`cli`]: Command-line interface implementation

pub mod build;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod seq;
pub mod support;

// Re-export commonly used types for convenience
pub use build::{AlignSource, AnnotSource, BuildConfig, FeatureBuilder, TransBlock};
pub use core::{Coords, Strand, TranscriptFeatures};
pub use support::{
    evaluate_transcript_support, EvalConfig, IgnoreSet, Support, SupportEvalResult,
    SupportEvidEvalResult,
};
