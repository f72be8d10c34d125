//! Indexed FASTA sequence source using noodles.
//!
//! Requires a `.fai` index next to the FASTA (`samtools faidx`). Sequence
//! lengths come from the index; bases come from region queries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use noodles::core::{Position, Region};
use noodles::fasta;

use crate::core::coords::Strand;
use crate::core::splice::reverse_complement;
use crate::seq::{SeqError, SeqSource};

pub struct FastaSeqSource {
    reader: RefCell<fasta::io::IndexedReader<fasta::io::BufReader<File>>>,
    lengths: HashMap<String, u64>,
}

impl FastaSeqSource {
    /// Open `path` and its `.fai` index.
    ///
    /// # Errors
    ///
    /// Returns `SeqError::Io` when the FASTA or its index cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SeqError> {
        let reader = fasta::io::indexed_reader::Builder::default().build_from_path(path)?;

        let fai_path = {
            let mut s = path.as_os_str().to_owned();
            s.push(".fai");
            std::path::PathBuf::from(s)
        };
        let index = fasta::fai::io::Reader::new(BufReader::new(File::open(&fai_path)?))
            .read_index()?;

        let mut lengths = HashMap::new();
        for record in index.as_ref() {
            let name = String::from_utf8_lossy(record.name()).to_string();
            lengths.insert(name, record.length());
        }

        Ok(Self {
            reader: RefCell::new(reader),
            lengths,
        })
    }
}

impl SeqSource for FastaSeqSource {
    fn get(&self, name: &str, start: u64, end: u64, strand: Strand) -> Result<String, SeqError> {
        let len = self.length(name)?;
        if start > end || end > len {
            return Err(SeqError::OutOfRange {
                name: name.to_string(),
                start,
                end,
                len,
            });
        }
        if start == end {
            return Ok(String::new());
        }

        // noodles regions are 1-based and closed.
        let begin = Position::try_from(start as usize + 1)
            .map_err(|e| SeqError::InvalidRegion(e.to_string()))?;
        let last = Position::try_from(end as usize)
            .map_err(|e| SeqError::InvalidRegion(e.to_string()))?;
        let region = Region::new(name, begin..=last);

        let record = self.reader.borrow_mut().query(&region)?;
        let bases = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
        Ok(match strand {
            Strand::Forward => bases,
            Strand::Reverse => reverse_complement(&bases),
        })
    }

    fn length(&self, name: &str) -> Result<u64, SeqError> {
        self.lengths
            .get(name)
            .copied()
            .ok_or_else(|| SeqError::UnknownSequence(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// One 10-base record plus its .fai (name, length, offset, linebases,
    /// linewidth).
    fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
        let fa = dir.path().join("genome.fa");
        fs::write(&fa, ">chr1\nAACCGGTTCA\n").unwrap();
        fs::write(dir.path().join("genome.fa.fai"), "chr1\t10\t6\t10\t11\n").unwrap();
        fa
    }

    #[test]
    fn test_open_and_query() {
        let dir = TempDir::new().unwrap();
        let src = FastaSeqSource::open(&write_fixture(&dir)).unwrap();

        assert_eq!(src.length("chr1").unwrap(), 10);
        assert_eq!(src.get("chr1", 0, 4, Strand::Forward).unwrap(), "AACC");
        assert_eq!(src.get("chr1", 0, 4, Strand::Reverse).unwrap(), "GGTT");
        assert_eq!(src.get("chr1", 3, 3, Strand::Forward).unwrap(), "");
        assert!(src.get("chr1", 0, 11, Strand::Forward).is_err());
        assert!(src.length("chrX").is_err());
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("noindex.fa");
        fs::write(&fa, ">chr1\nACGT\n").unwrap();
        assert!(FastaSeqSource::open(&fa).is_err());
    }
}
