use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::build::BuildError;

/// One ungapped block pairing a chromosome range with an RNA range.
///
/// Blocks arrive in transcription order, already flipped upstream to
/// "+"-chromosome orientation, so both coordinates increase left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransBlock {
    pub chrom_start: u64,
    pub chrom_end: u64,
    pub rna_start: u64,
    pub rna_end: u64,
}

impl TransBlock {
    pub fn new(chrom_start: u64, chrom_end: u64, rna_start: u64, rna_end: u64) -> Self {
        Self {
            chrom_start,
            chrom_end,
            rna_start,
            rna_end,
        }
    }

    pub fn chrom_len(&self) -> u64 {
        self.chrom_end - self.chrom_start
    }

    pub fn rna_len(&self) -> u64 {
        self.rna_end - self.rna_start
    }
}

/// Validate that a block list is non-empty and strictly increasing in both
/// chromosome and RNA coordinates.
pub(crate) fn check_blocks(id: &str, blocks: &[TransBlock]) -> Result<(), BuildError> {
    if blocks.is_empty() {
        return Err(BuildError::malformed(id, "empty block list"));
    }
    for (i, block) in blocks.iter().enumerate() {
        if block.chrom_start >= block.chrom_end || block.rna_start >= block.rna_end {
            return Err(BuildError::malformed(
                id,
                format!("empty or inverted block at index {i}"),
            ));
        }
        if i > 0 {
            let prev = &blocks[i - 1];
            if block.chrom_start < prev.chrom_end || block.rna_start < prev.rna_end {
                return Err(BuildError::malformed(
                    id,
                    format!("blocks not monotonically increasing at index {i}"),
                ));
            }
        }
    }
    Ok(())
}

/// Group blocks into exons: a run extends while the chromosomal gap to the
/// next block stays below `min_intron_size`.
pub(crate) fn group_exons(blocks: &[TransBlock], min_intron_size: u64) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..blocks.len() {
        let gap = blocks[i].chrom_start - blocks[i - 1].chrom_end;
        if gap >= min_intron_size {
            groups.push(start..i);
            start = i;
        }
    }
    groups.push(start..blocks.len());
    groups
}
