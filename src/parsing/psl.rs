//! Parser for PSL alignment files (BLAT, transMap).
//!
//! Each of the 21 columns is positional; `qStarts` are stored on the
//! aligned query strand, so they already ascend with the target for a
//! "-"-strand query. Rows whose second strand character marks a reversed
//! target are flipped here so every [`AlignSource`] leaves in
//! "+"-chromosome orientation, RNA coordinates ascending with it, with
//! the transcription strand recording the original query orientation.

use std::collections::HashMap;
use std::path::Path;

use crate::build::alignment::AlignSource;
use crate::build::blocks::TransBlock;
use crate::core::coords::Strand;
use crate::parsing::{open_text, parse_u64_list, ParseError};

const PSL_COLUMNS: usize = 21;

/// Parse a PSL file, plain or gzipped.
pub fn parse_psl_file(path: &Path) -> Result<Vec<AlignSource>, ParseError> {
    use std::io::BufRead;
    let reader = open_text(path)?;
    let mut sources = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        sources.push(parse_psl_line(path, i + 1, line)?);
    }
    Ok(sources)
}

/// Parse PSL rows from text; line numbers in errors are 1-based.
pub fn parse_psl_text(name: &str, text: &str) -> Result<Vec<AlignSource>, ParseError> {
    let path = Path::new(name);
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(i, line)| parse_psl_line(path, i + 1, line.trim_end()))
        .collect()
}

fn parse_psl_line(file: &Path, lnum: usize, line: &str) -> Result<AlignSource, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != PSL_COLUMNS {
        return Err(ParseError::record(
            file,
            lnum,
            format!("expected {PSL_COLUMNS} PSL columns, found {}", fields.len()),
        ));
    }

    let (query_strand, target_strand) = parse_strands(file, lnum, fields[8])?;
    let id = fields[9].to_string();
    let rna_size = parse_u64(file, lnum, "qSize", fields[10])?;
    let chrom_name = fields[13].to_string();
    let chrom_size = parse_u64(file, lnum, "tSize", fields[14])?;
    let block_count = parse_u64(file, lnum, "blockCount", fields[17])? as usize;
    let sizes = parse_u64_list(file, lnum, "blockSizes", fields[18])?;
    let q_starts = parse_u64_list(file, lnum, "qStarts", fields[19])?;
    let t_starts = parse_u64_list(file, lnum, "tStarts", fields[20])?;

    if sizes.len() != block_count || q_starts.len() != block_count || t_starts.len() != block_count
    {
        return Err(ParseError::record(
            file,
            lnum,
            format!(
                "blockCount {block_count} does not match list lengths {}/{}/{}",
                sizes.len(),
                q_starts.len(),
                t_starts.len()
            ),
        ));
    }

    for ((&size, &qs), &ts) in sizes.iter().zip(&q_starts).zip(&t_starts) {
        if qs + size > rna_size {
            return Err(ParseError::record(
                file,
                lnum,
                format!("block end {} exceeds qSize {rna_size}", qs + size),
            ));
        }
        if ts + size > chrom_size {
            return Err(ParseError::record(
                file,
                lnum,
                format!("block end {} exceeds tSize {chrom_size}", ts + size),
            ));
        }
    }

    let mut blocks: Vec<TransBlock> = sizes
        .iter()
        .zip(&q_starts)
        .zip(&t_starts)
        .map(|((&size, &qs), &ts)| TransBlock::new(ts, ts + size, qs, qs + size))
        .collect();

    // A reversed target is the same alignment reverse-complemented; flip
    // both coordinate systems back to "+"-target orientation.
    if target_strand == Strand::Reverse {
        blocks.reverse();
        for block in &mut blocks {
            *block = TransBlock::new(
                chrom_size - block.chrom_end,
                chrom_size - block.chrom_start,
                rna_size - block.rna_end,
                rna_size - block.rna_start,
            );
        }
    }
    let transcription_strand = if query_strand == target_strand {
        Strand::Forward
    } else {
        Strand::Reverse
    };

    Ok(AlignSource {
        id,
        chrom_name,
        chrom_size: Some(chrom_size),
        rna_size,
        transcription_strand,
        blocks,
        attrs: HashMap::new(),
    })
}

/// One strand character for mRNA alignments, two for translated ones where
/// the second is the target.
fn parse_strands(file: &Path, lnum: usize, text: &str) -> Result<(Strand, Strand), ParseError> {
    let mut chars = text.chars();
    let query = chars
        .next()
        .and_then(Strand::from_char)
        .ok_or_else(|| ParseError::record(file, lnum, format!("invalid strand '{text}'")))?;
    let target = match chars.next() {
        Some(c) => Strand::from_char(c)
            .ok_or_else(|| ParseError::record(file, lnum, format!("invalid strand '{text}'")))?,
        None => Strand::Forward,
    };
    Ok((query, target))
}

fn parse_u64(file: &Path, lnum: usize, column: &str, text: &str) -> Result<u64, ParseError> {
    text.parse()
        .map_err(|_| ParseError::record(file, lnum, format!("invalid {column} value '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(strand: &str, q_starts: &str, t_starts: &str) -> String {
        format!(
            "200\t0\t0\t0\t0\t0\t1\t100\t{strand}\tmrna1\t200\t0\t200\tchr1\t10000\t1000\t1300\t2\t100,100,\t{q_starts}\t{t_starts}"
        )
    }

    #[test]
    fn test_parse_forward_row() {
        let sources =
            parse_psl_text("aligns.psl", &row("+", "0,100,", "1000,1200,")).unwrap();
        assert_eq!(sources.len(), 1);
        let src = &sources[0];
        assert_eq!(src.id, "mrna1");
        assert_eq!(src.chrom_name, "chr1");
        assert_eq!(src.chrom_size, Some(10_000));
        assert_eq!(src.rna_size, 200);
        assert_eq!(src.transcription_strand, Strand::Forward);
        assert_eq!(src.blocks[0], TransBlock::new(1000, 1100, 0, 100));
        assert_eq!(src.blocks[1], TransBlock::new(1200, 1300, 100, 200));
    }

    #[test]
    fn test_reverse_query_keeps_block_order() {
        // qStarts are already on the aligned strand, ascending with the
        // target; only the transcription strand changes.
        let sources =
            parse_psl_text("aligns.psl", &row("-", "0,100,", "1000,1200,")).unwrap();
        let src = &sources[0];
        assert_eq!(src.transcription_strand, Strand::Reverse);
        assert_eq!(src.blocks[0], TransBlock::new(1000, 1100, 0, 100));
        assert_eq!(src.blocks[1], TransBlock::new(1200, 1300, 100, 200));
    }

    #[test]
    fn test_reversed_target_is_flipped() {
        // Same alignment as the forward row, expressed on the "-" target.
        let sources =
            parse_psl_text("aligns.psl", &row("+-", "0,100,", "8700,8900,")).unwrap();
        let src = &sources[0];
        assert_eq!(src.transcription_strand, Strand::Reverse);
        assert_eq!(src.blocks[0], TransBlock::new(1000, 1100, 0, 100));
        assert_eq!(src.blocks[1], TransBlock::new(1200, 1300, 100, 200));
    }

    #[test]
    fn test_block_past_target_end_rejected() {
        // Reversed-target row claiming tSize 100 while its blocks reach
        // 1300; must be a per-record error, not a panic.
        let line = "200\t0\t0\t0\t0\t0\t1\t100\t+-\tmrna1\t200\t0\t200\tchr1\t100\t1000\t1300\t2\t100,100,\t0,100,\t1000,1200,";
        let err = parse_psl_text("aligns.psl", line).unwrap_err();
        assert!(err.to_string().contains("exceeds tSize"));
    }

    #[test]
    fn test_block_past_query_end_rejected() {
        let line = "200\t0\t0\t0\t0\t0\t1\t100\t+\tmrna1\t50\t0\t50\tchr1\t10000\t1000\t1300\t2\t100,100,\t0,100,\t1000,1200,";
        let err = parse_psl_text("aligns.psl", line).unwrap_err();
        assert!(err.to_string().contains("exceeds qSize"));
    }

    #[test]
    fn test_column_count_enforced() {
        let err = parse_psl_text("aligns.psl", "1\t2\t3").unwrap_err();
        assert!(err.to_string().contains("21 PSL columns"));
    }

    #[test]
    fn test_builds_through_feature_builder() {
        use crate::build::{BuildConfig, FeatureBuilder};
        let sources =
            parse_psl_text("aligns.psl", &row("+", "0,100,", "1000,1200,")).unwrap();
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_alignment(&sources[0])
            .unwrap();
        assert_eq!(trans.exon_count(), 2);
        assert_eq!(trans.rna.size, Some(200));
    }
}
