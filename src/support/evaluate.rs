//! Multi-exon support evaluation: one annotation tree against one
//! evidence tree.
//!
//! Both trees are stored in "+"-chromosome orientation, so the comparison
//! walks exons left to right; the reported 5'/3' offsets and extension
//! counts are flipped to transcription direction at the end.

use serde::{Deserialize, Serialize};

use crate::core::coords::Strand;
use crate::core::feature::Exon;
use crate::core::transcript::TranscriptFeatures;
use crate::support::quality::{evaluate_quality, QualityLimits};
use crate::support::verdict::Support;

/// Policy and limits for the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// May the evidence have extra exons beyond the annotation's outer
    /// exons? When false, exon counts must match exactly.
    pub allow_extension: bool,
    pub limits: QualityLimits,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            allow_extension: true,
            limits: QualityLimits::default(),
        }
    }
}

/// Verdict for one (annotation, evidence) pair, with boundary offsets and
/// extension counts relative to the direction of transcription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportEvidEval {
    pub support: Support,
    /// Signed evidence-minus-annotation distance at the 5' boundary;
    /// zero when the evidence extends by whole exons instead.
    pub offset5: i64,
    pub offset3: i64,
    /// Whole evidence exons beyond the annotation's 5' end.
    pub extend5_exons: u32,
    pub extend3_exons: u32,
}

impl SupportEvidEval {
    fn rejected(support: Support) -> Self {
        Self {
            support,
            offset5: 0,
            offset3: 0,
            extend5_exons: 0,
            extend3_exons: 0,
        }
    }
}

/// Compare an annotation tree against one evidence tree.
///
/// The annotation must be multi-exon; single-exon transcripts need a
/// different algorithm and are skipped by the aggregator.
pub fn evaluate_evidence(
    annot: &TranscriptFeatures,
    evid: &TranscriptFeatures,
    config: &EvalConfig,
) -> SupportEvidEval {
    debug_assert!(annot.exon_count() > 1, "single-exon transcripts unsupported");

    // Evidence that can never support the transcript is rejected before
    // the per-exon comparison.
    let quality = evaluate_quality(evid, &config.limits);
    if !quality.is_supporting() {
        return SupportEvidEval::rejected(quality);
    }

    let ann_exons: Vec<&Exon> = annot.exons().collect();
    let ev_exons: Vec<&Exon> = evid.exons().collect();

    // Fast rejection on exon counts.
    let count_ok = if config.allow_extension {
        ev_exons.len() >= ann_exons.len()
    } else {
        ev_exons.len() == ann_exons.len()
    };
    if !count_ok {
        return SupportEvidEval::rejected(quality.worst(Support::FeatCountMismatch));
    }

    // Anchor on the evidence exon overlapping the annotation's first exon;
    // indexes need not line up when the evidence extends upstream.
    let Some(anchor) = ev_exons
        .iter()
        .position(|e| e.chrom.overlaps(&ann_exons[0].chrom))
    else {
        return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
    };
    if anchor + ann_exons.len() > ev_exons.len() {
        return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
    }

    let mut support = quality;
    let mut offset_start = 0i64;
    let mut offset_end = 0i64;
    let mut extend_start = 0u32;
    let mut extend_end = 0u32;

    // First exon: its inner (3'-ward) boundary is never negotiable.
    let first_ev = ev_exons[anchor];
    let first_ann = ann_exons[0];
    if first_ev.chrom.end != first_ann.chrom.end {
        return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
    }
    if anchor == 0 {
        offset_start = first_ev.chrom.start as i64 - first_ann.chrom.start as i64;
    } else {
        // Extra upstream evidence exons: only with extension allowed, and
        // only when the shared exon's start matches exactly.
        if !config.allow_extension || first_ev.chrom.start != first_ann.chrom.start {
            return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
        }
        support = support.worst(Support::ExtendsExons);
        extend_start = anchor as u32;
    }

    // Internal exons match exactly or not at all.
    for k in 1..ann_exons.len() - 1 {
        let ann = ann_exons[k];
        let ev = ev_exons[anchor + k];
        if ev.chrom.start != ann.chrom.start || ev.chrom.end != ann.chrom.end {
            return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
        }
    }

    // Last exon, mirror of the first.
    let last_idx = anchor + ann_exons.len() - 1;
    let last_ev = ev_exons[last_idx];
    let last_ann = ann_exons[ann_exons.len() - 1];
    if last_ev.chrom.start != last_ann.chrom.start {
        return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
    }
    if last_idx == ev_exons.len() - 1 {
        offset_end = last_ev.chrom.end as i64 - last_ann.chrom.end as i64;
    } else {
        if !config.allow_extension || last_ev.chrom.end != last_ann.chrom.end {
            return SupportEvidEval::rejected(quality.worst(Support::FeatMismatch));
        }
        support = support.worst(Support::ExtendsExons);
        extend_end = (ev_exons.len() - 1 - last_idx) as u32;
    }

    // Report relative to transcription direction, not genomic left/right.
    let (offset5, offset3, extend5_exons, extend3_exons) = match annot.transcription_strand {
        Strand::Forward => (offset_start, offset_end, extend_start, extend_end),
        Strand::Reverse => (offset_end, offset_start, extend_end, extend_start),
    };

    SupportEvidEval {
        support,
        offset5,
        offset3,
        extend5_exons,
        extend3_exons,
    }
}
