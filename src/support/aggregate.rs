//! Full-length support aggregation across an evidence set.
//!
//! Runs the evaluator over every evidence tree overlapping a transcript,
//! keeps supporting results, resolves duplicate evidence ids, buckets by
//! verdict and folds each bucket into one summary record. Output ordering
//! is reproducible regardless of evidence iteration order.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::transcript::TranscriptFeatures;
use crate::support::evaluate::{evaluate_evidence, EvalConfig};
use crate::support::verdict::Support;

/// Attribute key under which builders record the owning gene id.
pub const GENE_ID_ATTR: &str = "gene_id";

/// Genes and transcripts excluded from support evaluation entirely.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    genes: HashSet<String>,
    transcripts: HashSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gene(&mut self, id: impl Into<String>) {
        self.genes.insert(id.into());
    }

    pub fn add_transcript(&mut self, id: impl Into<String>) {
        self.transcripts.insert(id.into());
    }

    pub fn is_ignored(&self, annot: &TranscriptFeatures) -> bool {
        if self.transcripts.contains(&annot.id) {
            return true;
        }
        annot
            .attr(GENE_ID_ATTR)
            .is_some_and(|gene| self.genes.contains(gene))
    }
}

/// Per-evidence detail row. Field names and order are a persisted
/// contract with downstream loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportEvidEvalResult {
    pub transcript_id: String,
    pub evid_set_id: String,
    pub evid_id: String,
    pub support: Support,
    pub offset5: i64,
    pub offset3: i64,
    pub extend5_exons: u32,
    pub extend3_exons: u32,
}

/// Per-verdict summary row for one (transcript, evidence-set) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportEvalResult {
    pub transcript_id: String,
    pub evid_set_id: String,
    pub support: Support,
    pub evid_count: u32,
    pub offset5: i64,
    pub offset3: i64,
    pub extend5_exons: u32,
    pub extend3_exons: u32,
}

/// Detail and summary rows for one transcript against one evidence set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSupport {
    pub details: Vec<SupportEvidEvalResult>,
    pub summaries: Vec<SupportEvalResult>,
}

/// Evaluate all evidence in one set against one annotation transcript.
///
/// Returns `None` for single-exon and ignored transcripts; no rows are
/// emitted for them. Evidence not overlapping the transcript is skipped.
pub fn evaluate_transcript_support(
    annot: &TranscriptFeatures,
    evid_set_id: &str,
    evidence: &[TranscriptFeatures],
    config: &EvalConfig,
    ignore: &IgnoreSet,
) -> Option<TranscriptSupport> {
    if annot.exon_count() < 2 {
        tracing::debug!(transcript = %annot.id, "skipping single-exon transcript");
        return None;
    }
    if ignore.is_ignored(annot) {
        tracing::debug!(transcript = %annot.id, "skipping ignored transcript");
        return None;
    }

    // Duplicate evidence ids happen when the same sequence was imported
    // from multiple sources; keep the best result per id.
    let mut by_id: HashMap<String, SupportEvidEvalResult> = HashMap::new();
    for evid in evidence {
        if !evid.chrom.overlaps(&annot.chrom) {
            continue;
        }
        let eval = evaluate_evidence(annot, evid, config);
        if !eval.support.is_supporting() {
            continue;
        }
        let row = SupportEvidEvalResult {
            transcript_id: annot.id.clone(),
            evid_set_id: evid_set_id.to_string(),
            evid_id: evid.id.clone(),
            support: eval.support,
            offset5: eval.offset5,
            offset3: eval.offset3,
            extend5_exons: eval.extend5_exons,
            extend3_exons: eval.extend3_exons,
        };
        match by_id.get(&row.evid_id) {
            Some(existing) if !is_better(&row, existing) => {}
            _ => {
                by_id.insert(row.evid_id.clone(), row);
            }
        }
    }

    let mut details: Vec<SupportEvidEvalResult> = by_id.into_values().collect();
    details.sort_by(|a, b| a.evid_id.cmp(&b.evid_id));

    let mut buckets: BTreeMap<Support, Vec<&SupportEvidEvalResult>> = BTreeMap::new();
    for row in &details {
        buckets.entry(row.support).or_default().push(row);
    }

    let summaries = buckets
        .into_iter()
        .map(|(support, rows)| SupportEvalResult {
            transcript_id: annot.id.clone(),
            evid_set_id: evid_set_id.to_string(),
            support,
            evid_count: rows.len() as u32,
            offset5: abs_max(rows.iter().map(|r| r.offset5)),
            offset3: abs_max(rows.iter().map(|r| r.offset3)),
            extend5_exons: rows.iter().map(|r| r.extend5_exons).max().unwrap_or(0),
            extend3_exons: rows.iter().map(|r| r.extend3_exons).max().unwrap_or(0),
        })
        .collect();

    Some(TranscriptSupport { details, summaries })
}

/// Better verdict first; among equals, larger total extension, then larger
/// total offset, then a fixed offset comparison so the winner does not
/// depend on input order.
fn is_better(a: &SupportEvidEvalResult, b: &SupportEvidEvalResult) -> bool {
    let key = |r: &SupportEvidEvalResult| {
        (
            std::cmp::Reverse(r.support),
            u64::from(r.extend5_exons) + u64::from(r.extend3_exons),
            r.offset5.unsigned_abs() + r.offset3.unsigned_abs(),
            (r.offset5, r.offset3),
        )
    };
    key(a) > key(b)
}

/// Entry of maximum magnitude, sign preserved; ties prefer the positive.
fn abs_max(values: impl Iterator<Item = i64>) -> i64 {
    values.max_by_key(|v| (v.unsigned_abs(), *v)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{AlignSource, AnnotSource, BuildConfig, FeatureBuilder, TransBlock};
    use crate::core::coords::Strand;

    fn annot(blocks: Vec<TransBlock>) -> TranscriptFeatures {
        FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&AnnotSource {
                id: "tx".to_string(),
                chrom_name: "chr1".to_string(),
                chrom_size: None,
                transcription_strand: Strand::Forward,
                blocks,
                frames: Vec::new(),
                cds_chrom: None,
                attrs: [(GENE_ID_ATTR.to_string(), "gene1".to_string())].into(),
            })
            .unwrap()
    }

    fn evid(id: &str, blocks: Vec<TransBlock>) -> TranscriptFeatures {
        let rna_size = blocks.last().unwrap().rna_end;
        FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&AlignSource {
                id: id.to_string(),
                chrom_name: "chr1".to_string(),
                chrom_size: None,
                rna_size,
                transcription_strand: Strand::Forward,
                blocks,
                attrs: Default::default(),
            })
            .unwrap()
    }

    fn two_exon_annot() -> TranscriptFeatures {
        annot(vec![
            TransBlock::new(100, 200, 0, 100),
            TransBlock::new(300, 400, 100, 200),
        ])
    }

    fn exact_evid(id: &str) -> TranscriptFeatures {
        evid(
            id,
            vec![
                TransBlock::new(100, 200, 0, 100),
                TransBlock::new(300, 400, 100, 200),
            ],
        )
    }

    fn polymorphic_evid(id: &str) -> TranscriptFeatures {
        // Same exon boundaries, 4-base indel inside the first exon.
        evid(
            id,
            vec![
                TransBlock::new(100, 150, 0, 50),
                TransBlock::new(154, 200, 50, 96),
                TransBlock::new(300, 400, 96, 196),
            ],
        )
    }

    #[test]
    fn test_bucketing_and_fold() {
        let a = two_exon_annot();
        let extending = evid(
            "ev3",
            vec![
                TransBlock::new(20, 60, 0, 40),
                TransBlock::new(100, 200, 40, 140),
                TransBlock::new(300, 400, 140, 240),
            ],
        );
        let evidence = vec![exact_evid("ev1"), exact_evid("ev2"), extending];

        let result = evaluate_transcript_support(
            &a,
            "mrnas",
            &evidence,
            &EvalConfig::default(),
            &IgnoreSet::new(),
        )
        .unwrap();

        assert_eq!(result.details.len(), 3);
        assert_eq!(result.summaries.len(), 2);
        let good = &result.summaries[0];
        assert_eq!(good.support, Support::Good);
        assert_eq!(good.evid_count, 2);
        assert_eq!((good.offset5, good.offset3), (0, 0));
        assert_eq!((good.extend5_exons, good.extend3_exons), (0, 0));
        let extends = &result.summaries[1];
        assert_eq!(extends.support, Support::ExtendsExons);
        assert_eq!(extends.evid_count, 1);
        assert_eq!(extends.extend5_exons, 1);
    }

    #[test]
    fn test_duplicate_evidence_keeps_best() {
        let a = two_exon_annot();
        let evidence = vec![polymorphic_evid("evA"), exact_evid("evA")];

        let result = evaluate_transcript_support(
            &a,
            "ests",
            &evidence,
            &EvalConfig::default(),
            &IgnoreSet::new(),
        )
        .unwrap();

        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].support, Support::Good);
    }

    #[test]
    fn test_non_supporting_evidence_dropped() {
        let a = two_exon_annot();
        // Shifted internal boundary: feat_mismatch, filtered out.
        let bad = evid(
            "evBad",
            vec![
                TransBlock::new(100, 201, 0, 101),
                TransBlock::new(300, 400, 101, 201),
            ],
        );
        let result = evaluate_transcript_support(
            &a,
            "mrnas",
            &[bad],
            &EvalConfig::default(),
            &IgnoreSet::new(),
        )
        .unwrap();
        assert!(result.details.is_empty());
        assert!(result.summaries.is_empty());
    }

    #[test]
    fn test_single_exon_skipped() {
        let a = annot(vec![TransBlock::new(100, 400, 0, 300)]);
        let result = evaluate_transcript_support(
            &a,
            "mrnas",
            &[exact_evid("ev1")],
            &EvalConfig::default(),
            &IgnoreSet::new(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_ignored_gene_skipped() {
        let a = two_exon_annot();
        let mut ignore = IgnoreSet::new();
        ignore.add_gene("gene1");
        let result = evaluate_transcript_support(
            &a,
            "mrnas",
            &[exact_evid("ev1")],
            &EvalConfig::default(),
            &ignore,
        );
        assert!(result.is_none());
    }
}
