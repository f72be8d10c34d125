//! Transcription-support evaluation.
//!
//! Three layers: [`quality`] grades one evidence tree in isolation,
//! [`evaluate`] compares an annotation tree against one evidence tree,
//! and [`aggregate`] folds results across a whole evidence set into
//! per-verdict summaries.

pub mod aggregate;
pub mod evaluate;
pub mod quality;
pub mod verdict;

pub use aggregate::{
    evaluate_transcript_support, IgnoreSet, SupportEvalResult, SupportEvidEvalResult,
    TranscriptSupport, GENE_ID_ATTR,
};
pub use evaluate::{evaluate_evidence, EvalConfig, SupportEvidEval};
pub use quality::{evaluate_quality, QualityLimits};
pub use verdict::Support;
