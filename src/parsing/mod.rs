//! Parsers for the tab-separated inputs of the evaluator.
//!
//! This module provides parsers for:
//!
//! - **genePred files**: UCSC gene annotations, 10 or 15 columns, with an
//!   optional leading bin column
//! - **PSL files**: BLAT/transMap alignments of evidence RNAs
//! - **id list files**: one gene or transcript id per line
//!
//! All parsers accept plain or gzip-compressed files transparently.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

pub mod genepred;
pub mod psl;

pub use genepred::{parse_genepred_file, parse_genepred_text};
pub use psl::{parse_psl_file, parse_psl_text};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{file} line {line}: {reason}")]
    InvalidRecord {
        file: String,
        line: usize,
        reason: String,
    },
}

impl ParseError {
    fn record(file: &Path, line: usize, reason: impl Into<String>) -> Self {
        ParseError::InvalidRecord {
            file: file.display().to_string(),
            line,
            reason: reason.into(),
        }
    }
}

/// Is the path gzip-compressed, judging by extension?
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a text file, decompressing gzip transparently.
pub(crate) fn open_text(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_gzipped(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Parse an id list file: one id per line, blank lines and `#` comments
/// skipped.
pub fn parse_id_list_file(path: &Path) -> Result<Vec<String>, ParseError> {
    let reader = open_text(path)?;
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        ids.push(line.to_string());
    }
    Ok(ids)
}

/// Split a comma-separated genePred/PSL list column, tolerating the
/// conventional trailing comma.
fn parse_u64_list(
    file: &Path,
    line: usize,
    column: &str,
    text: &str,
) -> Result<Vec<u64>, ParseError> {
    text.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                ParseError::record(file, line, format!("invalid {column} value '{s}'"))
            })
        })
        .collect()
}
