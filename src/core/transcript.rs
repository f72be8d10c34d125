use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::coords::{Coords, MissingSizeError, Strand};
use crate::core::feature::{Exon, Intron, TransFeature};

/// Root of a feature tree built from one alignment or annotation record.
///
/// Features are owned as a flat sequence in chromosome order ("+"-strand
/// storage orientation); typed navigation is iterator filtering over that
/// sequence. The tree is immutable after construction; the only whole-tree
/// transform is [`TranscriptFeatures::reverse_complement`], which builds a
/// new root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFeatures {
    /// Transcript or evidence identifier.
    pub id: String,
    /// Chromosomal extent of the transcript.
    pub chrom: Coords,
    /// RNA extent covered by the features. The strand of this range is the
    /// orientation of the RNA coordinates relative to "+"-chromosome storage.
    pub rna: Coords,
    /// Genomic strand the transcript is transcribed from.
    pub transcription_strand: Strand,
    /// CDS bounds on the chromosome, for coding transcripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds_chrom: Option<Coords>,
    pub features: Vec<TransFeature>,
    /// Free-form attribute payload (gene id, source tags, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,
}

impl TranscriptFeatures {
    pub fn exons(&self) -> impl Iterator<Item = &Exon> {
        self.features.iter().filter_map(TransFeature::as_exon)
    }

    pub fn introns(&self) -> impl Iterator<Item = &Intron> {
        self.features.iter().filter_map(TransFeature::as_intron)
    }

    pub fn exon_count(&self) -> usize {
        self.exons().count()
    }

    pub fn first_exon(&self) -> Option<&Exon> {
        self.exons().next()
    }

    pub fn last_exon(&self) -> Option<&Exon> {
        self.exons().last()
    }

    pub fn is_coding(&self) -> bool {
        self.cds_chrom.is_some()
    }

    /// Attribute lookup, e.g. the owning gene id.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Verify that the children of every feature tile its RNA range, and
    /// that the features together tile the transcript's RNA range. A
    /// violation means the input block list was internally inconsistent.
    pub fn check_rna_tiling(&self) -> Result<(), String> {
        let mut offset = self.rna.start;
        for feat in &self.features {
            let rna = feat.rna();
            if rna.start != offset {
                return Err(format!(
                    "feature {rna} does not start at running RNA offset {offset} in {}",
                    self.id
                ));
            }
            let child_ranges = match feat {
                TransFeature::Exon(e) => e.subs.rna_ranges(),
                TransFeature::Intron(i) => i.subs.iter().map(|s| s.rna()).collect(),
            };
            if !child_ranges.is_empty() {
                let mut child_offset = rna.start;
                for child in child_ranges {
                    if child.start != child_offset {
                        return Err(format!(
                            "sub-feature {child} does not start at RNA offset {child_offset} in {}",
                            self.id
                        ));
                    }
                    child_offset = child.end;
                }
                if child_offset != rna.end {
                    return Err(format!(
                        "sub-features end at RNA offset {child_offset}, expected {} in {}",
                        rna.end, self.id
                    ));
                }
            }
            offset = rna.end;
        }
        if offset != self.rna.end {
            return Err(format!(
                "features end at RNA offset {offset}, expected {} in {}",
                self.rna.end, self.id
            ));
        }
        Ok(())
    }

    /// Produce a fully mirrored copy of the tree: coordinates reflected
    /// about their total sizes, child ordering reversed, frames recomputed
    /// and splice bases swapped-and-complemented. The original is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MissingSizeError`] when the chromosome or RNA total size
    /// is unknown; reversal is undefined without it.
    pub fn reverse_complement(&self) -> Result<TranscriptFeatures, MissingSizeError> {
        let cds_chrom = match &self.cds_chrom {
            Some(cds) => Some(cds.reverse()?),
            None => None,
        };
        Ok(TranscriptFeatures {
            id: self.id.clone(),
            chrom: self.chrom.reverse()?,
            rna: self.rna.reverse()?,
            transcription_strand: self.transcription_strand,
            cds_chrom,
            features: self
                .features
                .iter()
                .rev()
                .map(TransFeature::reverse_complement)
                .collect::<Result<_, _>>()?,
            attrs: self.attrs.clone(),
        })
    }
}

impl std::fmt::Display for TranscriptFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({} exons, strand {})",
            self.id,
            self.chrom,
            self.exon_count(),
            self.transcription_strand
        )
    }
}
