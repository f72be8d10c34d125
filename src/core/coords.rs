use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strand of a sequence range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Parse from the conventional `+`/`-` character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// Reversal was requested on a range whose total sequence size is unknown.
#[derive(Debug, Clone, Error)]
#[error("cannot reverse {name}:{start}-{end}: total sequence size unknown")]
pub struct MissingSizeError {
    pub name: String,
    pub start: u64,
    pub end: u64,
}

/// Half-open coordinate range on a named sequence (chromosome or RNA).
///
/// `size` is the total length of the underlying sequence; it is required
/// for strand reversal and may be unknown for some input sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub name: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Coords {
    pub fn new(name: impl Into<String>, start: u64, end: u64, strand: Strand) -> Self {
        let coords = Self {
            name: name.into(),
            start,
            end,
            strand,
            size: None,
        };
        debug_assert!(coords.start <= coords.end, "inverted range {coords}");
        coords
    }

    #[must_use]
    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Do the two ranges share any bases? Strand is ignored.
    pub fn overlaps(&self, other: &Coords) -> bool {
        self.name == other.name && self.start < other.end && other.start < self.end
    }

    /// Same sequence and bounds, regardless of strand.
    pub fn same_locus(&self, other: &Coords) -> bool {
        self.name == other.name && self.start == other.start && self.end == other.end
    }

    /// Extract a sub-range; `start..end` must lie within this range.
    #[must_use]
    pub fn subrange(&self, start: u64, end: u64) -> Coords {
        debug_assert!(
            self.start <= start && end <= self.end && start <= end,
            "subrange {start}-{end} outside {self}"
        );
        Coords {
            name: self.name.clone(),
            start,
            end,
            strand: self.strand,
            size: self.size,
        }
    }

    /// Reflect the range onto the opposite strand.
    ///
    /// # Errors
    ///
    /// Returns [`MissingSizeError`] when the total sequence size is unknown.
    pub fn reverse(&self) -> Result<Coords, MissingSizeError> {
        let size = self.size.ok_or_else(|| MissingSizeError {
            name: self.name.clone(),
            start: self.start,
            end: self.end,
        })?;
        Ok(Coords {
            name: self.name.clone(),
            start: size - self.end,
            end: size - self.start,
            strand: self.strand.flip(),
            size: self.size,
        })
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}/{}", self.name, self.start, self.end, self.strand)
    }
}
