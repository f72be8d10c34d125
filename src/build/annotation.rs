//! Annotation (gene model) feature tree builder.
//!
//! Sub-features are emitted in chromosome order; which side of the CDS is
//! UTR5 vs UTR3 follows the transcription strand, so reverse-strand
//! transcripts read UTR3→CDS→UTR5 left to right.

use std::collections::HashMap;

use crate::build::blocks::{check_blocks, group_exons, TransBlock};
use crate::build::{classify_splice_sites, BuildConfig, BuildError};
use crate::core::coords::{Coords, Strand};
use crate::core::feature::{AnnotFeature, Exon, Frame, Intron, SubFeatures, TransFeature};
use crate::core::transcript::TranscriptFeatures;
use crate::seq::SeqSource;

/// Block-level view of one annotation record (e.g. one genePred row).
#[derive(Debug, Clone)]
pub struct AnnotSource {
    pub id: String,
    pub chrom_name: String,
    pub chrom_size: Option<u64>,
    pub transcription_strand: Strand,
    pub blocks: Vec<TransBlock>,
    /// Reading frame of each block's CDS portion, in transcription
    /// direction; empty when the input carries no frame column.
    pub frames: Vec<Option<Frame>>,
    /// CDS bounds on the chromosome; `None` for non-coding transcripts.
    pub cds_chrom: Option<(u64, u64)>,
    pub attrs: HashMap<String, String>,
}

pub(crate) fn build(
    config: &BuildConfig,
    seqs: Option<&dyn SeqSource>,
    src: &AnnotSource,
) -> Result<TranscriptFeatures, BuildError> {
    check_blocks(&src.id, &src.blocks)?;
    if !src.frames.is_empty() && src.frames.len() != src.blocks.len() {
        return Err(BuildError::malformed(
            &src.id,
            "frame count does not match block count",
        ));
    }

    let chrom_size = match src.chrom_size {
        Some(size) => Some(size),
        None => match seqs {
            Some(seqs) => Some(seqs.length(&src.chrom_name)?),
            None => None,
        },
    };

    let blocks = &src.blocks;
    let tx_start = blocks[0].chrom_start;
    let tx_end = blocks[blocks.len() - 1].chrom_end;
    if let Some((cs, ce)) = src.cds_chrom {
        if cs >= ce || cs < tx_start || ce > tx_end {
            return Err(BuildError::malformed(
                &src.id,
                format!("CDS {cs}-{ce} outside transcript bounds {tx_start}-{tx_end}"),
            ));
        }
    }

    let rna_size = blocks[blocks.len() - 1].rna_end;
    let chrom_range = |start: u64, end: u64| {
        Coords::new(src.chrom_name.clone(), start, end, Strand::Forward).with_size(chrom_size)
    };
    let rna_range = |start: u64, end: u64| {
        Coords::new(src.id.clone(), start, end, src.transcription_strand).with_size(Some(rna_size))
    };

    let frames = resolve_frames(src);

    let mut features = Vec::new();
    let groups = group_exons(blocks, config.min_intron_size);
    for (gi, group) in groups.iter().enumerate() {
        let first = &blocks[group.start];
        let last = &blocks[group.end - 1];

        let mut subs = Vec::new();
        for i in group.clone() {
            let block = &blocks[i];
            if i > group.start {
                let prev = &blocks[i - 1];
                if block.rna_start != prev.rna_end {
                    return Err(BuildError::malformed(
                        &src.id,
                        format!("RNA gap within annotation exon at block {i}"),
                    ));
                }
                if block.chrom_start > prev.chrom_end {
                    // Closed micro-gap: annotated on the chromosome, absent
                    // from the RNA.
                    subs.push(AnnotFeature::Gap {
                        chrom: chrom_range(prev.chrom_end, block.chrom_start),
                        rna: rna_range(block.rna_start, block.rna_start),
                    });
                }
            }
            split_block(src, block, frames[i], &chrom_range, &rna_range, &mut subs);
        }

        features.push(TransFeature::Exon(Exon {
            chrom: chrom_range(first.chrom_start, last.chrom_end),
            rna: rna_range(first.rna_start, last.rna_end),
            subs: SubFeatures::Annot(subs),
        }));

        if gi + 1 < groups.len() {
            let next = &blocks[groups[gi + 1].start];
            if next.rna_start != last.rna_end {
                return Err(BuildError::malformed(
                    &src.id,
                    "RNA gap across annotation intron",
                ));
            }
            let (donor_seq, acceptor_seq, motif) =
                classify_splice_sites(seqs, &src.chrom_name, last.chrom_end, next.chrom_start)?;
            features.push(TransFeature::Intron(Intron {
                chrom: chrom_range(last.chrom_end, next.chrom_start),
                rna: rna_range(last.rna_end, last.rna_end),
                donor_seq,
                acceptor_seq,
                motif,
                subs: Vec::new(),
            }));
        }
    }

    let trans = TranscriptFeatures {
        id: src.id.clone(),
        chrom: chrom_range(tx_start, tx_end),
        rna: rna_range(blocks[0].rna_start, rna_size),
        transcription_strand: src.transcription_strand,
        cds_chrom: src.cds_chrom.map(|(cs, ce)| chrom_range(cs, ce)),
        features,
        attrs: src.attrs.clone(),
    };
    trans
        .check_rna_tiling()
        .map_err(|reason| BuildError::malformed(&src.id, reason))?;
    Ok(trans)
}

/// Frame for every block's CDS portion: the annotated frame when recorded,
/// otherwise propagated from the count of CDS bases 5' of the block.
fn resolve_frames(src: &AnnotSource) -> Vec<Frame> {
    let blocks = &src.blocks;
    let cds_len = |b: &TransBlock| match src.cds_chrom {
        Some((cs, ce)) => {
            let lo = cs.clamp(b.chrom_start, b.chrom_end);
            let hi = ce.clamp(b.chrom_start, b.chrom_end);
            hi - lo
        }
        None => 0,
    };
    let total_cds: u64 = blocks.iter().map(cds_len).sum();

    let mut frames = Vec::with_capacity(blocks.len());
    let mut prefix = 0u64;
    for (i, block) in blocks.iter().enumerate() {
        let len = cds_len(block);
        // CDS bases 5' of this block, in transcription direction.
        let tx_offset = match src.transcription_strand {
            Strand::Forward => prefix,
            Strand::Reverse => total_cds - prefix - len,
        };
        let fallback = (tx_offset % 3) as Frame;
        frames.push(src.frames.get(i).copied().flatten().unwrap_or(fallback));
        prefix += len;
    }
    frames
}

/// Split one block into UTR/CDS segments against the CDS bounds, or emit a
/// single non-coding region when there is no CDS.
fn split_block(
    src: &AnnotSource,
    block: &TransBlock,
    frame: Frame,
    chrom_range: &impl Fn(u64, u64) -> Coords,
    rna_range: &impl Fn(u64, u64) -> Coords,
    subs: &mut Vec<AnnotFeature>,
) {
    let rna_at = |pos: u64| block.rna_start + (pos - block.chrom_start);
    let Some((cs, ce)) = src.cds_chrom else {
        subs.push(AnnotFeature::NonCoding {
            chrom: chrom_range(block.chrom_start, block.chrom_end),
            rna: rna_range(block.rna_start, block.rna_end),
        });
        return;
    };

    let lo = cs.clamp(block.chrom_start, block.chrom_end);
    let hi = ce.clamp(block.chrom_start, block.chrom_end);

    if block.chrom_start < lo {
        let chrom = chrom_range(block.chrom_start, lo);
        let rna = rna_range(block.rna_start, rna_at(lo));
        // Left of the CDS is 5' only on the forward strand.
        subs.push(match src.transcription_strand {
            Strand::Forward => AnnotFeature::Utr5 { chrom, rna },
            Strand::Reverse => AnnotFeature::Utr3 { chrom, rna },
        });
    }
    if lo < hi {
        subs.push(AnnotFeature::Cds {
            chrom: chrom_range(lo, hi),
            rna: rna_range(rna_at(lo), rna_at(hi)),
            frame,
        });
    }
    if hi < block.chrom_end {
        let chrom = chrom_range(hi, block.chrom_end);
        let rna = rna_range(rna_at(hi), block.rna_end);
        subs.push(match src.transcription_strand {
            Strand::Forward => AnnotFeature::Utr3 { chrom, rna },
            Strand::Reverse => AnnotFeature::Utr5 { chrom, rna },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::FeatureBuilder;
    use crate::seq::MemSeqSource;

    fn coding_source(strand: Strand) -> AnnotSource {
        // Two exons, CDS spanning the intron.
        AnnotSource {
            id: "tx1".to_string(),
            chrom_name: "chr1".to_string(),
            chrom_size: Some(10_000),
            transcription_strand: strand,
            blocks: vec![
                TransBlock::new(1000, 1100, 0, 100),
                TransBlock::new(1200, 1300, 100, 200),
            ],
            frames: Vec::new(),
            cds_chrom: Some((1050, 1250)),
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_coding_forward_layout() {
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&coding_source(Strand::Forward))
            .unwrap();

        assert_eq!(trans.exon_count(), 2);
        assert_eq!(trans.introns().count(), 1);
        assert!(trans.check_rna_tiling().is_ok());

        let exons: Vec<_> = trans.exons().collect();
        let SubFeatures::Annot(first) = &exons[0].subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(first[0], AnnotFeature::Utr5 { .. }));
        assert!(matches!(first[1], AnnotFeature::Cds { frame: 0, .. }));
        let SubFeatures::Annot(second) = &exons[1].subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(second[0], AnnotFeature::Cds { frame: 2, .. }));
        assert!(matches!(second[1], AnnotFeature::Utr3 { .. }));

        let intron = trans.introns().next().unwrap();
        assert_eq!((intron.chrom.start, intron.chrom.end), (1100, 1200));
        assert!(intron.rna.is_empty());
    }

    #[test]
    fn test_coding_reverse_utr_order() {
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&coding_source(Strand::Reverse))
            .unwrap();

        let exons: Vec<_> = trans.exons().collect();
        let SubFeatures::Annot(first) = &exons[0].subs else {
            panic!("expected annotation sub-features");
        };
        // Left of the CDS is the 3' side of a reverse-strand transcript.
        assert!(matches!(first[0], AnnotFeature::Utr3 { .. }));
        let SubFeatures::Annot(second) = &exons[1].subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(second[1], AnnotFeature::Utr5 { .. }));
        // 5'-most CDS block (the right one) starts the reading frame.
        assert!(matches!(second[0], AnnotFeature::Cds { frame: 0, .. }));
        let SubFeatures::Annot(first) = &exons[0].subs else {
            unreachable!();
        };
        assert!(matches!(first[1], AnnotFeature::Cds { frame: 2, .. }));
    }

    #[test]
    fn test_micro_gap_closes_with_gap_feature() {
        let src = AnnotSource {
            id: "tx2".to_string(),
            chrom_name: "chr1".to_string(),
            chrom_size: None,
            transcription_strand: Strand::Forward,
            blocks: vec![
                TransBlock::new(1000, 1100, 0, 100),
                TransBlock::new(1110, 1200, 100, 190),
            ],
            frames: Vec::new(),
            cds_chrom: None,
            attrs: HashMap::new(),
        };
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&src)
            .unwrap();

        assert_eq!(trans.exon_count(), 1);
        let exon = trans.first_exon().unwrap();
        let SubFeatures::Annot(subs) = &exon.subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(subs[0], AnnotFeature::NonCoding { .. }));
        assert!(matches!(subs[1], AnnotFeature::Gap { .. }));
        assert!(matches!(subs[2], AnnotFeature::NonCoding { .. }));
        let AnnotFeature::Gap { chrom, rna } = &subs[1] else {
            unreachable!();
        };
        assert_eq!((chrom.start, chrom.end), (1100, 1110));
        assert!(rna.is_empty());
    }

    #[test]
    fn test_splice_sites_classified_and_cased() {
        let mut seqs = MemSeqSource::new();
        // Intron 1100..1200: GT at the donor, AG at the acceptor.
        let mut genome = vec![b'c'; 2000];
        genome[1100] = b'G';
        genome[1101] = b'T';
        genome[1198] = b'A';
        genome[1199] = b'G';
        seqs.insert("chr1", String::from_utf8(genome).unwrap());

        let mut src = coding_source(Strand::Forward);
        src.chrom_size = None;
        let trans = FeatureBuilder::new(BuildConfig::default())
            .with_seq_source(&seqs)
            .build_annotation(&src)
            .unwrap();

        assert_eq!(trans.chrom.size, Some(2000)); // from the capability
        let intron = trans.introns().next().unwrap();
        assert_eq!(intron.motif, crate::core::SpliceMotif::GtAg);
        assert_eq!(intron.donor_seq.as_deref(), Some("GT"));
        assert_eq!(intron.acceptor_seq.as_deref(), Some("AG"));
    }

    #[test]
    fn test_coding_reverse_complement_round_trip() {
        let mut seqs = MemSeqSource::new();
        let mut genome = vec![b'c'; 2000];
        genome[1100] = b'G';
        genome[1101] = b'T';
        genome[1198] = b'A';
        genome[1199] = b'G';
        seqs.insert("chr1", String::from_utf8(genome).unwrap());

        let mut src = coding_source(Strand::Forward);
        src.chrom_size = None;
        let trans = FeatureBuilder::new(BuildConfig::default())
            .with_seq_source(&seqs)
            .build_annotation(&src)
            .unwrap();
        let rc = trans.reverse_complement().unwrap();

        // Donor and acceptor trade places complemented; the motif follows
        // the new pair and the known-motif upper-casing carries over.
        let intron = rc.introns().next().unwrap();
        assert_eq!(intron.donor_seq.as_deref(), Some("CT"));
        assert_eq!(intron.acceptor_seq.as_deref(), Some("AC"));
        assert_eq!(intron.motif, crate::core::SpliceMotif::CtAc);
        assert_eq!((intron.chrom.start, intron.chrom.end), (800, 900));

        // Feature order is mirrored and each 50-base CDS segment gets its
        // frame recomputed from the opposite end.
        let exons: Vec<_> = rc.exons().collect();
        let SubFeatures::Annot(first) = &exons[0].subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(first[0], AnnotFeature::Utr3 { .. }));
        assert!(matches!(first[1], AnnotFeature::Cds { frame: 2, .. }));
        let SubFeatures::Annot(second) = &exons[1].subs else {
            panic!("expected annotation sub-features");
        };
        assert!(matches!(second[0], AnnotFeature::Cds { frame: 1, .. }));
        assert!(matches!(second[1], AnnotFeature::Utr5 { .. }));

        // Reversing twice restores the tree, splice bases and frames
        // included.
        assert_eq!(rc.reverse_complement().unwrap(), trans);
    }

    #[test]
    fn test_unknown_splice_sites_stay_lowercase() {
        let mut seqs = MemSeqSource::new();
        seqs.insert("chr1", "c".repeat(2000));
        let mut src = coding_source(Strand::Forward);
        src.chrom_size = None;
        let trans = FeatureBuilder::new(BuildConfig::default())
            .with_seq_source(&seqs)
            .build_annotation(&src)
            .unwrap();

        let intron = trans.introns().next().unwrap();
        assert_eq!(intron.motif, crate::core::SpliceMotif::Unknown);
        assert_eq!(intron.donor_seq.as_deref(), Some("cc"));
    }

    #[test]
    fn test_cds_outside_bounds_rejected() {
        let mut src = coding_source(Strand::Forward);
        src.cds_chrom = Some((900, 1250));
        let err = FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&src)
            .unwrap_err();
        assert!(matches!(err, BuildError::MalformedInput { .. }));
    }
}
