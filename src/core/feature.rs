use serde::{Deserialize, Serialize};

use crate::core::coords::{Coords, MissingSizeError};
use crate::core::splice::{reverse_complement, SpliceMotif};

/// Reading-frame phase (0, 1, 2) of the first base of a CDS region,
/// counted as its offset within the codon in transcription direction.
pub type Frame = u8;

/// Recompute a frame for a reverse-complemented CDS region.
///
/// The new frame is the region's offset from the opposite end of the CDS,
/// which is congruent to `-(frame + len) mod 3`. The formula is its own
/// inverse, so reversing twice restores the original frame.
pub fn reverse_frame(frame: Frame, rna_len: u64) -> Frame {
    ((3 - ((u64::from(frame) + rna_len) % 3)) % 3) as Frame
}

/// Sub-feature of an exon or intron built from an annotation (gene model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotFeature {
    /// 5' untranslated region.
    Utr5 { chrom: Coords, rna: Coords },
    /// Coding region with its reading frame.
    Cds {
        chrom: Coords,
        rna: Coords,
        frame: Frame,
    },
    /// 3' untranslated region.
    Utr3 { chrom: Coords, rna: Coords },
    /// Exonic region of a non-coding transcript.
    NonCoding { chrom: Coords, rna: Coords },
    /// Chromosomal micro-gap closed into the exon; no direct annotation
    /// support, zero-width on the RNA side.
    Gap { chrom: Coords, rna: Coords },
}

impl AnnotFeature {
    pub fn chrom(&self) -> &Coords {
        match self {
            AnnotFeature::Utr5 { chrom, .. }
            | AnnotFeature::Cds { chrom, .. }
            | AnnotFeature::Utr3 { chrom, .. }
            | AnnotFeature::NonCoding { chrom, .. }
            | AnnotFeature::Gap { chrom, .. } => chrom,
        }
    }

    pub fn rna(&self) -> &Coords {
        match self {
            AnnotFeature::Utr5 { rna, .. }
            | AnnotFeature::Cds { rna, .. }
            | AnnotFeature::Utr3 { rna, .. }
            | AnnotFeature::NonCoding { rna, .. }
            | AnnotFeature::Gap { rna, .. } => rna,
        }
    }

    pub(crate) fn reverse_complement(&self) -> Result<AnnotFeature, MissingSizeError> {
        Ok(match self {
            AnnotFeature::Utr5 { chrom, rna } => AnnotFeature::Utr5 {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
            AnnotFeature::Cds { chrom, rna, frame } => AnnotFeature::Cds {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
                frame: reverse_frame(*frame, rna.len()),
            },
            AnnotFeature::Utr3 { chrom, rna } => AnnotFeature::Utr3 {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
            AnnotFeature::NonCoding { chrom, rna } => AnnotFeature::NonCoding {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
            AnnotFeature::Gap { chrom, rna } => AnnotFeature::Gap {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
        })
    }
}

/// Sub-feature of an exon or intron built from an alignment (evidence).
///
/// Inserts carry both ranges so every feature pins a position on both the
/// chromosome and the RNA; the side without bases is zero-width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignFeature {
    /// Ungapped aligned block.
    Block { chrom: Coords, rna: Coords },
    /// Extra chromosome bases (RNA deletion); zero-width on the RNA side.
    ChromInsert { chrom: Coords, rna: Coords },
    /// Extra RNA bases (chromosome deletion); zero-width on the chrom side.
    RnaInsert { chrom: Coords, rna: Coords },
}

impl AlignFeature {
    pub fn chrom(&self) -> &Coords {
        match self {
            AlignFeature::Block { chrom, .. }
            | AlignFeature::ChromInsert { chrom, .. }
            | AlignFeature::RnaInsert { chrom, .. } => chrom,
        }
    }

    pub fn rna(&self) -> &Coords {
        match self {
            AlignFeature::Block { rna, .. }
            | AlignFeature::ChromInsert { rna, .. }
            | AlignFeature::RnaInsert { rna, .. } => rna,
        }
    }

    /// Number of inserted bases, for indel grading. Zero for aligned blocks.
    pub fn indel_size(&self) -> u64 {
        match self {
            AlignFeature::Block { .. } => 0,
            AlignFeature::ChromInsert { chrom, .. } => chrom.len(),
            AlignFeature::RnaInsert { rna, .. } => rna.len(),
        }
    }

    pub(crate) fn reverse_complement(&self) -> Result<AlignFeature, MissingSizeError> {
        Ok(match self {
            AlignFeature::Block { chrom, rna } => AlignFeature::Block {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
            AlignFeature::ChromInsert { chrom, rna } => AlignFeature::ChromInsert {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
            AlignFeature::RnaInsert { chrom, rna } => AlignFeature::RnaInsert {
                chrom: chrom.reverse()?,
                rna: rna.reverse()?,
            },
        })
    }
}

/// Children of an exon: one closed set per tree kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubFeatures {
    Annot(Vec<AnnotFeature>),
    Align(Vec<AlignFeature>),
}

impl SubFeatures {
    pub fn len(&self) -> usize {
        match self {
            SubFeatures::Annot(v) => v.len(),
            SubFeatures::Align(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RNA extents of the children, in stored order.
    pub fn rna_ranges(&self) -> Vec<&Coords> {
        match self {
            SubFeatures::Annot(v) => v.iter().map(AnnotFeature::rna).collect(),
            SubFeatures::Align(v) => v.iter().map(AlignFeature::rna).collect(),
        }
    }

    fn reverse_complement(&self) -> Result<SubFeatures, MissingSizeError> {
        Ok(match self {
            SubFeatures::Annot(v) => SubFeatures::Annot(
                v.iter()
                    .rev()
                    .map(AnnotFeature::reverse_complement)
                    .collect::<Result<_, _>>()?,
            ),
            SubFeatures::Align(v) => SubFeatures::Align(
                v.iter()
                    .rev()
                    .map(AlignFeature::reverse_complement)
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// A transcribed exon with its sub-feature breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub chrom: Coords,
    pub rna: Coords,
    pub subs: SubFeatures,
}

impl Exon {
    pub(crate) fn reverse_complement(&self) -> Result<Exon, MissingSizeError> {
        Ok(Exon {
            chrom: self.chrom.reverse()?,
            rna: self.rna.reverse()?,
            subs: self.subs.reverse_complement()?,
        })
    }
}

/// A spliced-out intron. The RNA range is zero-width unless the evidence
/// left RNA bases unaligned across the junction, in which case those bases
/// appear as `RnaInsert` children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intron {
    pub chrom: Coords,
    pub rna: Coords,
    /// Two bases at the intron's chromosomal start. Upper-case iff the
    /// motif is recognized; downstream code relies on that convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_seq: Option<String>,
    /// Two bases at the intron's chromosomal end, same case convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptor_seq: Option<String>,
    pub motif: SpliceMotif,
    pub subs: Vec<AlignFeature>,
}

impl Intron {
    pub(crate) fn reverse_complement(&self) -> Result<Intron, MissingSizeError> {
        // Donor and acceptor trade places on the other strand; the motif is
        // re-derived from the new pair so the case convention carries over.
        let donor_seq = self.acceptor_seq.as_deref().map(reverse_complement);
        let acceptor_seq = self.donor_seq.as_deref().map(reverse_complement);
        let motif = match (&donor_seq, &acceptor_seq) {
            (Some(d), Some(a)) => SpliceMotif::classify(d, a),
            _ => SpliceMotif::Unknown,
        };
        Ok(Intron {
            chrom: self.chrom.reverse()?,
            rna: self.rna.reverse()?,
            donor_seq,
            acceptor_seq,
            motif,
            subs: self
                .subs
                .iter()
                .rev()
                .map(AlignFeature::reverse_complement)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Top-level feature of a transcript: an exon or an intron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransFeature {
    Exon(Exon),
    Intron(Intron),
}

impl TransFeature {
    pub fn chrom(&self) -> &Coords {
        match self {
            TransFeature::Exon(e) => &e.chrom,
            TransFeature::Intron(i) => &i.chrom,
        }
    }

    pub fn rna(&self) -> &Coords {
        match self {
            TransFeature::Exon(e) => &e.rna,
            TransFeature::Intron(i) => &i.rna,
        }
    }

    pub fn as_exon(&self) -> Option<&Exon> {
        match self {
            TransFeature::Exon(e) => Some(e),
            TransFeature::Intron(_) => None,
        }
    }

    pub fn as_intron(&self) -> Option<&Intron> {
        match self {
            TransFeature::Intron(i) => Some(i),
            TransFeature::Exon(_) => None,
        }
    }

    pub(crate) fn reverse_complement(&self) -> Result<TransFeature, MissingSizeError> {
        Ok(match self {
            TransFeature::Exon(e) => TransFeature::Exon(e.reverse_complement()?),
            TransFeature::Intron(i) => TransFeature::Intron(i.reverse_complement()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_frame_is_involution() {
        for frame in 0..3u8 {
            for len in [1u64, 2, 3, 7, 99, 100] {
                let rc = reverse_frame(frame, len);
                assert!(rc < 3);
                assert_eq!(reverse_frame(rc, len), frame, "frame={frame} len={len}");
            }
        }
    }

    #[test]
    fn test_reverse_frame_full_codons() {
        // A region of whole codons starting at a codon boundary still starts
        // at a codon boundary read from the other end.
        assert_eq!(reverse_frame(0, 9), 0);
        assert_eq!(reverse_frame(0, 10), 2);
    }
}
