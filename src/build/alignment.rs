//! Evidence (alignment) feature tree builder.
//!
//! Same block-grouping and intron-synthesis pass as the annotation
//! builder, but exon children are aligned blocks interleaved with insert
//! features. At any one position an `RnaInsert` precedes a `ChromInsert`
//! (insertion-then-deletion convention), and a block's own `Block` feature
//! always follows its leading inserts. Every intron carries a
//! `ChromInsert` for the spliced-out gap itself; RNA bases left unaligned
//! across the junction become an additional `RnaInsert`.

use std::collections::HashMap;

use crate::build::blocks::{check_blocks, group_exons, TransBlock};
use crate::build::{classify_splice_sites, BuildConfig, BuildError};
use crate::core::coords::{Coords, Strand};
use crate::core::feature::{AlignFeature, Exon, Intron, SubFeatures, TransFeature};
use crate::core::transcript::TranscriptFeatures;
use crate::seq::SeqSource;

/// Block-level view of one alignment record (e.g. one PSL row), already
/// canonicalized to "+"-target orientation.
#[derive(Debug, Clone)]
pub struct AlignSource {
    /// Evidence id (the aligned sequence's name).
    pub id: String,
    pub chrom_name: String,
    pub chrom_size: Option<u64>,
    /// Full length of the aligned RNA, including unaligned ends.
    pub rna_size: u64,
    pub transcription_strand: Strand,
    pub blocks: Vec<TransBlock>,
    pub attrs: HashMap<String, String>,
}

pub(crate) fn build(
    config: &BuildConfig,
    seqs: Option<&dyn SeqSource>,
    src: &AlignSource,
) -> Result<TranscriptFeatures, BuildError> {
    check_blocks(&src.id, &src.blocks)?;

    let chrom_size = match src.chrom_size {
        Some(size) => Some(size),
        None => match seqs {
            Some(seqs) => Some(seqs.length(&src.chrom_name)?),
            None => None,
        },
    };

    let blocks = &src.blocks;
    let chrom_range = |start: u64, end: u64| {
        Coords::new(src.chrom_name.clone(), start, end, Strand::Forward).with_size(chrom_size)
    };
    let rna_range = |start: u64, end: u64| {
        Coords::new(src.id.clone(), start, end, src.transcription_strand)
            .with_size(Some(src.rna_size))
    };

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
                if block.rna_start > prev.rna_end {
                    subs.push(AlignFeature::RnaInsert {
                        chrom: chrom_range(prev.chrom_end, prev.chrom_end),
                        rna: rna_range(prev.rna_end, block.rna_start),
                    });
                }
                if block.chrom_start > prev.chrom_end {
                    subs.push(AlignFeature::ChromInsert {
                        chrom: chrom_range(prev.chrom_end, block.chrom_start),
                        rna: rna_range(block.rna_start, block.rna_start),
                    });
                }
            }
            subs.push(AlignFeature::Block {
                chrom: chrom_range(block.chrom_start, block.chrom_end),
                rna: rna_range(block.rna_start, block.rna_end),
            });
        }

        features.push(TransFeature::Exon(Exon {
            chrom: chrom_range(first.chrom_start, last.chrom_end),
            rna: rna_range(first.rna_start, last.rna_end),
            subs: SubFeatures::Align(subs),
        }));

        if gi + 1 < groups.len() {
            let next = &blocks[groups[gi + 1].start];
            let mut subs = Vec::new();
            if next.rna_start > last.rna_end {
                // RNA bases unaligned across the junction.
                subs.push(AlignFeature::RnaInsert {
                    chrom: chrom_range(last.chrom_end, last.chrom_end),
                    rna: rna_range(last.rna_end, next.rna_start),
                });
            }
            // The spliced-out gap itself.
            subs.push(AlignFeature::ChromInsert {
                chrom: chrom_range(last.chrom_end, next.chrom_start),
                rna: rna_range(next.rna_start, next.rna_start),
            });

            let (donor_seq, acceptor_seq, motif) =
                classify_splice_sites(seqs, &src.chrom_name, last.chrom_end, next.chrom_start)?;
            features.push(TransFeature::Intron(Intron {
                chrom: chrom_range(last.chrom_end, next.chrom_start),
                rna: rna_range(last.rna_end, next.rna_start),
                donor_seq,
                acceptor_seq,
                motif,
                subs,
            }));
        }
    }

    let trans = TranscriptFeatures {
        id: src.id.clone(),
        chrom: chrom_range(blocks[0].chrom_start, blocks[blocks.len() - 1].chrom_end),
        rna: rna_range(blocks[0].rna_start, blocks[blocks.len() - 1].rna_end),
        transcription_strand: src.transcription_strand,
        cds_chrom: None,
        features,
        attrs: src.attrs.clone(),
    };
    trans
        .check_rna_tiling()
        .map_err(|reason| BuildError::malformed(&src.id, reason))?;
    Ok(trans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::FeatureBuilder;

    fn source(blocks: Vec<TransBlock>) -> AlignSource {
        AlignSource {
            id: "ev1".to_string(),
            chrom_name: "chr1".to_string(),
            chrom_size: Some(10_000),
            rna_size: 500,
            transcription_strand: Strand::Forward,
            blocks,
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_clean_two_exon_alignment() {
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&source(vec![
                TransBlock::new(1000, 1100, 0, 100),
                TransBlock::new(1200, 1300, 100, 200),
            ]))
            .unwrap();

        assert_eq!(trans.exon_count(), 2);
        for exon in trans.exons() {
            assert_eq!(exon.subs.len(), 1);
        }
        let intron = trans.introns().next().unwrap();
        assert!(intron.rna.is_empty());
        // Just the implicit gap.
        assert_eq!(intron.subs.len(), 1);
        assert!(matches!(intron.subs[0], AlignFeature::ChromInsert { .. }));
    }

    #[test]
    fn test_insert_interleaving_order() {
        // Micro-gap on both chrom and RNA at the same position inside one
        // exon: RnaInsert must precede ChromInsert, block comes last.
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&source(vec![
                TransBlock::new(1000, 1100, 0, 100),
                TransBlock::new(1105, 1200, 103, 198),
            ]))
            .unwrap();

        assert_eq!(trans.exon_count(), 1);
        let exon = trans.first_exon().unwrap();
        let SubFeatures::Align(subs) = &exon.subs else {
            panic!("expected alignment sub-features");
        };
        assert_eq!(subs.len(), 4);
        assert!(matches!(subs[0], AlignFeature::Block { .. }));
        assert!(matches!(subs[1], AlignFeature::RnaInsert { .. }));
        assert!(matches!(subs[2], AlignFeature::ChromInsert { .. }));
        assert!(matches!(subs[3], AlignFeature::Block { .. }));
        assert_eq!(subs[1].indel_size(), 3);
        assert_eq!(subs[2].indel_size(), 5);
        assert!(trans.check_rna_tiling().is_ok());
    }

    #[test]
    fn test_unaligned_rna_across_intron() {
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&source(vec![
                TransBlock::new(1000, 1100, 0, 100),
                TransBlock::new(1200, 1300, 110, 210),
            ]))
            .unwrap();

        let intron = trans.introns().next().unwrap();
        assert_eq!((intron.rna.start, intron.rna.end), (100, 110));
        assert_eq!(intron.subs.len(), 2);
        assert!(matches!(intron.subs[0], AlignFeature::RnaInsert { .. }));
        assert!(matches!(intron.subs[1], AlignFeature::ChromInsert { .. }));
        assert!(trans.check_rna_tiling().is_ok());
    }

    #[test]
    fn test_reverse_complement_round_trip() {
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&source(vec![
                TransBlock::new(1000, 1100, 10, 110),
                TransBlock::new(1200, 1305, 110, 215),
            ]))
            .unwrap();

        let rc = trans.reverse_complement().unwrap();
        assert_eq!(rc.chrom.start, 10_000 - trans.chrom.end);
        assert_eq!(rc.exon_count(), trans.exon_count());
        assert!(rc.check_rna_tiling().is_ok());
        assert_eq!(rc.reverse_complement().unwrap(), trans);
    }
}
