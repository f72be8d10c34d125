//! Parser for UCSC genePred annotation files.
//!
//! Handles the 10-column basic and 15-column extended layouts, with an
//! optional leading bin column as produced by table dumps. Each row is
//! turned into an [`AnnotSource`] ready for the feature tree builder:
//! exons become blocks with cumulative RNA coordinates in genome order,
//! `exonFrames` values of -1 become unannotated frames, and a `name2`
//! column is recorded as the gene id attribute.

use std::collections::HashMap;
use std::path::Path;

use crate::build::annotation::AnnotSource;
use crate::build::blocks::TransBlock;
use crate::core::coords::Strand;
use crate::core::feature::Frame;
use crate::parsing::{open_text, parse_u64_list, ParseError};
use crate::support::GENE_ID_ATTR;

const BASIC_COLUMNS: usize = 10;
const EXTENDED_COLUMNS: usize = 15;

/// Parse a genePred file, plain or gzipped.
pub fn parse_genepred_file(path: &Path) -> Result<Vec<AnnotSource>, ParseError> {
    use std::io::BufRead;
    let reader = open_text(path)?;
    let mut sources = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        sources.push(parse_genepred_line(path, i + 1, line)?);
    }
    Ok(sources)
}

/// Parse genePred rows from text; line numbers in errors are 1-based.
pub fn parse_genepred_text(name: &str, text: &str) -> Result<Vec<AnnotSource>, ParseError> {
    let path = Path::new(name);
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(i, line)| parse_genepred_line(path, i + 1, line.trim_end()))
        .collect()
}

fn parse_genepred_line(file: &Path, lnum: usize, line: &str) -> Result<AnnotSource, ParseError> {
    let mut fields: Vec<&str> = line.split('\t').collect();
    // Table dumps prepend a numeric bin column.
    if fields.len() == BASIC_COLUMNS + 1 || fields.len() == EXTENDED_COLUMNS + 1 {
        fields.remove(0);
    }
    if fields.len() != BASIC_COLUMNS && fields.len() != EXTENDED_COLUMNS {
        return Err(ParseError::record(
            file,
            lnum,
            format!("expected 10 or 15 genePred columns, found {}", fields.len()),
        ));
    }

    let id = fields[0].to_string();
    let chrom_name = fields[1].to_string();
    let transcription_strand = parse_strand(file, lnum, fields[2])?;
    let cds_start = parse_u64(file, lnum, "cdsStart", fields[5])?;
    let cds_end = parse_u64(file, lnum, "cdsEnd", fields[6])?;
    let exon_count = parse_u64(file, lnum, "exonCount", fields[7])? as usize;
    let exon_starts = parse_u64_list(file, lnum, "exonStarts", fields[8])?;
    let exon_ends = parse_u64_list(file, lnum, "exonEnds", fields[9])?;

    if exon_starts.len() != exon_count || exon_ends.len() != exon_count {
        return Err(ParseError::record(
            file,
            lnum,
            format!(
                "exonCount {exon_count} does not match {} starts / {} ends",
                exon_starts.len(),
                exon_ends.len()
            ),
        ));
    }

    // Cumulative RNA coordinates in genome order; the builder's tree keeps
    // "+"-chromosome orientation regardless of transcription strand.
    let mut blocks = Vec::with_capacity(exon_count);
    let mut rna_offset = 0u64;
    for (&start, &end) in exon_starts.iter().zip(&exon_ends) {
        if start >= end {
            return Err(ParseError::record(
                file,
                lnum,
                format!("empty or inverted exon {start}-{end}"),
            ));
        }
        let len = end - start;
        blocks.push(TransBlock::new(start, end, rna_offset, rna_offset + len));
        rna_offset += len;
    }

    let frames = if fields.len() == EXTENDED_COLUMNS {
        parse_frames(file, lnum, fields[14], exon_count)?
    } else {
        Vec::new()
    };

    let mut attrs = HashMap::new();
    if fields.len() == EXTENDED_COLUMNS && !fields[11].is_empty() {
        attrs.insert(GENE_ID_ATTR.to_string(), fields[11].to_string());
    }

    // cdsStart == cdsEnd marks a non-coding transcript.
    let cds_chrom = (cds_start < cds_end).then_some((cds_start, cds_end));

    Ok(AnnotSource {
        id,
        chrom_name,
        chrom_size: None,
        transcription_strand,
        blocks,
        frames,
        cds_chrom,
        attrs,
    })
}

fn parse_frames(
    file: &Path,
    lnum: usize,
    text: &str,
    exon_count: usize,
) -> Result<Vec<Option<Frame>>, ParseError> {
    let frames: Vec<Option<Frame>> = text
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<i8>() {
            Ok(-1) => Ok(None),
            Ok(f @ 0..=2) => Ok(Some(f as Frame)),
            _ => Err(ParseError::record(
                file,
                lnum,
                format!("invalid exonFrames value '{s}'"),
            )),
        })
        .collect::<Result<_, _>>()?;
    if frames.len() != exon_count {
        return Err(ParseError::record(
            file,
            lnum,
            format!(
                "exonFrames has {} entries for {exon_count} exons",
                frames.len()
            ),
        ));
    }
    Ok(frames)
}

fn parse_strand(file: &Path, lnum: usize, text: &str) -> Result<Strand, ParseError> {
    text.chars()
        .next()
        .and_then(Strand::from_char)
        .ok_or_else(|| ParseError::record(file, lnum, format!("invalid strand '{text}'")))
}

fn parse_u64(file: &Path, lnum: usize, column: &str, text: &str) -> Result<u64, ParseError> {
    text.parse()
        .map_err(|_| ParseError::record(file, lnum, format!("invalid {column} value '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENDED_ROW: &str = "ENST01\tchr1\t+\t1000\t5000\t1200\t4800\t3\t1000,2000,4000,\t1500,2500,5000,\t0\tGENE1\tcmpl\tcmpl\t0,0,1,";

    #[test]
    fn test_parse_extended_row() {
        let sources = parse_genepred_text("annots.gp", EXTENDED_ROW).unwrap();
        assert_eq!(sources.len(), 1);
        let src = &sources[0];
        assert_eq!(src.id, "ENST01");
        assert_eq!(src.chrom_name, "chr1");
        assert_eq!(src.transcription_strand, Strand::Forward);
        assert_eq!(src.cds_chrom, Some((1200, 4800)));
        assert_eq!(src.blocks.len(), 3);
        assert_eq!(src.blocks[0], TransBlock::new(1000, 1500, 0, 500));
        assert_eq!(src.blocks[1], TransBlock::new(2000, 2500, 500, 1000));
        assert_eq!(src.blocks[2], TransBlock::new(4000, 5000, 1000, 2000));
        assert_eq!(src.frames, vec![Some(0), Some(0), Some(1)]);
        assert_eq!(src.attrs.get(GENE_ID_ATTR).map(String::as_str), Some("GENE1"));
    }

    #[test]
    fn test_parse_basic_row_with_bin() {
        let row = "585\tNR_001\tchrX\t-\t100\t900\t500\t500\t2\t100,600,\t300,900,";
        let sources = parse_genepred_text("annots.gp", row).unwrap();
        let src = &sources[0];
        assert_eq!(src.id, "NR_001");
        assert_eq!(src.transcription_strand, Strand::Reverse);
        // cdsStart == cdsEnd: non-coding.
        assert_eq!(src.cds_chrom, None);
        assert!(src.frames.is_empty());
        assert!(src.attrs.is_empty());
    }

    #[test]
    fn test_unannotated_frames() {
        let row = "NR_002\tchr2\t+\t100\t900\t200\t800\t2\t100,600,\t300,900,\t0\tGENE2\tincmpl\tincmpl\t-1,-1,";
        let sources = parse_genepred_text("annots.gp", row).unwrap();
        assert_eq!(sources[0].frames, vec![None, None]);
    }

    #[test]
    fn test_exon_count_mismatch() {
        let row = "ENST02\tchr1\t+\t100\t900\t100\t900\t3\t100,600,\t300,900,";
        let err = parse_genepred_text("annots.gp", row).unwrap_err();
        assert!(err.to_string().contains("exonCount"));
    }

    #[test]
    fn test_builds_through_feature_builder() {
        use crate::build::{BuildConfig, FeatureBuilder};
        let sources = parse_genepred_text("annots.gp", EXTENDED_ROW).unwrap();
        let trans = FeatureBuilder::new(BuildConfig::default())
            .build_annotation(&sources[0])
            .unwrap();
        assert_eq!(trans.exon_count(), 3);
        assert!(trans.is_coding());
    }
}
