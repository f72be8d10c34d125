use serde::{Deserialize, Serialize};

use crate::core::coords::{Coords, Strand};
use crate::core::transcript::TranscriptFeatures;

/// Transcripts grouped under one gene id on one chromosome.
///
/// Bounds are the union chromosomal extent of the added transcripts. All
/// transcripts of a gene must share chromosome and transcription strand;
/// a mismatch indicates a bug in the grouping code, not bad user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    pub gene_id: String,
    pub chrom_name: String,
    pub transcription_strand: Strand,
    pub transcripts: Vec<TranscriptFeatures>,
}

impl GeneAnnotation {
    pub fn new(
        gene_id: impl Into<String>,
        chrom_name: impl Into<String>,
        transcription_strand: Strand,
    ) -> Self {
        Self {
            gene_id: gene_id.into(),
            chrom_name: chrom_name.into(),
            transcription_strand,
            transcripts: Vec::new(),
        }
    }

    pub fn add(&mut self, trans: TranscriptFeatures) {
        assert_eq!(
            trans.chrom.name, self.chrom_name,
            "transcript {} on wrong chromosome for gene {}",
            trans.id, self.gene_id
        );
        assert_eq!(
            trans.transcription_strand, self.transcription_strand,
            "transcript {} on wrong strand for gene {}",
            trans.id, self.gene_id
        );
        self.transcripts.push(trans);
    }

    /// Min/max chromosomal extent of all added transcripts.
    pub fn bounds(&self) -> Option<Coords> {
        let first = self.transcripts.first()?;
        let mut start = first.chrom.start;
        let mut end = first.chrom.end;
        for t in &self.transcripts[1..] {
            start = start.min(t.chrom.start);
            end = end.max(t.chrom.end);
        }
        Some(Coords::new(self.chrom_name.clone(), start, end, Strand::Forward).with_size(first.chrom.size))
    }
}
