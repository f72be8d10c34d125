//! Sequence access capability.
//!
//! The core algorithms never open genome files themselves; splice-site
//! lookup is injected as a [`SeqSource`]. Implementations here:
//!
//! - [`MemSeqSource`]: in-memory sequences, used by tests and fixtures
//! - [`CachedSeqSource`]: memoizing wrapper, one locus worth of lifetime
//! - [`fasta::FastaSeqSource`]: indexed FASTA on disk (via noodles)

pub mod fasta;

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::core::coords::Strand;
use crate::core::splice::reverse_complement;

#[derive(Debug, Error)]
pub enum SeqError {
    #[error("unknown sequence: {0}")]
    UnknownSequence(String),

    #[error("region {name}:{start}-{end} out of range (sequence length {len})")]
    OutOfRange {
        name: String,
        start: u64,
        end: u64,
        len: u64,
    },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("sequence I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow "get sequence by region and strand" capability.
///
/// `get` returns bases for the half-open `start..end` range; for
/// [`Strand::Reverse`] the bases are reverse-complemented.
pub trait SeqSource {
    fn get(&self, name: &str, start: u64, end: u64, strand: Strand) -> Result<String, SeqError>;

    fn length(&self, name: &str) -> Result<u64, SeqError>;
}

/// In-memory sequence source keyed by name, "+"-strand sequences.
#[derive(Debug, Default)]
pub struct MemSeqSource {
    seqs: HashMap<String, String>,
}

impl MemSeqSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, seq: impl Into<String>) {
        self.seqs.insert(name.into(), seq.into());
    }
}

impl SeqSource for MemSeqSource {
    fn get(&self, name: &str, start: u64, end: u64, strand: Strand) -> Result<String, SeqError> {
        let seq = self
            .seqs
            .get(name)
            .ok_or_else(|| SeqError::UnknownSequence(name.to_string()))?;
        let len = seq.len() as u64;
        if start > end || end > len {
            return Err(SeqError::OutOfRange {
                name: name.to_string(),
                start,
                end,
                len,
            });
        }
        let bases = &seq[start as usize..end as usize];
        Ok(match strand {
            Strand::Forward => bases.to_string(),
            Strand::Reverse => reverse_complement(bases),
        })
    }

    fn length(&self, name: &str) -> Result<u64, SeqError> {
        self.seqs
            .get(name)
            .map(|s| s.len() as u64)
            .ok_or_else(|| SeqError::UnknownSequence(name.to_string()))
    }
}

/// Memoizing wrapper around another source.
///
/// Splice-site lookups repeat heavily within one locus; the cache keys on
/// `(name, start, end, strand)` and is intended to live for one locus's
/// processing (no eviction).
pub struct CachedSeqSource<'a> {
    inner: &'a dyn SeqSource,
    regions: RefCell<HashMap<(String, u64, u64, Strand), String>>,
    lengths: RefCell<HashMap<String, u64>>,
}

impl<'a> CachedSeqSource<'a> {
    pub fn new(inner: &'a dyn SeqSource) -> Self {
        Self {
            inner,
            regions: RefCell::new(HashMap::new()),
            lengths: RefCell::new(HashMap::new()),
        }
    }
}

impl SeqSource for CachedSeqSource<'_> {
    fn get(&self, name: &str, start: u64, end: u64, strand: Strand) -> Result<String, SeqError> {
        let key = (name.to_string(), start, end, strand);
        if let Some(bases) = self.regions.borrow().get(&key) {
            return Ok(bases.clone());
        }
        let bases = self.inner.get(name, start, end, strand)?;
        self.regions.borrow_mut().insert(key, bases.clone());
        Ok(bases)
    }

    fn length(&self, name: &str) -> Result<u64, SeqError> {
        if let Some(&len) = self.lengths.borrow().get(name) {
            return Ok(len);
        }
        let len = self.inner.length(name)?;
        self.lengths.borrow_mut().insert(name.to_string(), len);
        Ok(len)
    }
}
