use serde::{Deserialize, Serialize};

use crate::core::feature::{AlignFeature, Exon, Intron, SubFeatures, TransFeature};
use crate::core::transcript::TranscriptFeatures;
use crate::support::verdict::Support;

/// Tunable limits for grading evidence alignments in isolation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityLimits {
    /// Largest single indel tolerated inside an exon.
    pub max_single_indel: u64,
    /// Largest total indel content tolerated, as a fraction of the exon's
    /// chromosomal length.
    pub max_indel_fraction: f64,
}

impl Default for QualityLimits {
    fn default() -> Self {
        Self {
            max_single_indel: 36,
            max_indel_fraction: 0.1,
        }
    }
}

/// Grade one evidence tree in isolation: the best support it could ever
/// contribute, before any comparison against an annotation.
///
/// Exons are graded on indel sizes and content; introns on unaligned RNA
/// bases inside the junction. The overall grade is the worst across all
/// features.
pub fn evaluate_quality(evid: &TranscriptFeatures, limits: &QualityLimits) -> Support {
    let mut overall = Support::Good;
    for feat in &evid.features {
        let grade = match feat {
            TransFeature::Exon(exon) => grade_exon(evid, exon, limits),
            TransFeature::Intron(intron) => grade_intron(intron),
        };
        overall = overall.worst(grade);
    }
    overall
}

fn grade_exon(evid: &TranscriptFeatures, exon: &Exon, limits: &QualityLimits) -> Support {
    let SubFeatures::Align(subs) = &exon.subs else {
        // Annotation trees carry no alignment evidence to grade.
        return Support::Good;
    };
    if subs.len() <= 1 {
        return Support::Good;
    }

    let mut total = 0u64;
    let mut largest = 0u64;
    for sub in subs {
        if let AlignFeature::RnaInsert { rna, .. } = sub {
            if is_terminal_unaligned(evid, rna.start, rna.end) {
                // Unaligned transcript ends, not exon polymorphism.
                continue;
            }
        }
        let size = sub.indel_size();
        total += size;
        largest = largest.max(size);
    }

    #[allow(clippy::cast_precision_loss)]
    let max_total = limits.max_indel_fraction * exon.chrom.len() as f64;
    if largest > limits.max_single_indel {
        Support::LargeIndelSize
    } else if total as f64 > max_total {
        Support::LargeIndelContent
    } else if total > 0 {
        Support::Polymorphic
    } else {
        Support::Good
    }
}

fn grade_intron(intron: &Intron) -> Support {
    // One sub-feature is the implicit spliced-out gap; anything more means
    // RNA bases were left unaligned inside the intron.
    if intron.subs.len() > 1 {
        Support::InternalUnaligned
    } else {
        Support::Good
    }
}

/// Is this RNA range pinned at the transcript's absolute RNA ends?
fn is_terminal_unaligned(evid: &TranscriptFeatures, start: u64, end: u64) -> bool {
    let size = evid.rna.size.unwrap_or(evid.rna.end);
    start == 0 || end == size || start == evid.rna.start || end == evid.rna.end
}
