use serde::{Deserialize, Serialize};

/// Known splice-junction donor/acceptor dinucleotide motifs.
///
/// Anything outside the six-entry table classifies as [`SpliceMotif::Unknown`];
/// that is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpliceMotif {
    #[serde(rename = "GT/AG")]
    GtAg,
    #[serde(rename = "CT/AC")]
    CtAc,
    #[serde(rename = "GC/AG")]
    GcAg,
    #[serde(rename = "CT/GC")]
    CtGc,
    #[serde(rename = "AT/AC")]
    AtAc,
    #[serde(rename = "GT/AT")]
    GtAt,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Which spliceosome recognizes a motif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spliceosome {
    Major,
    Minor,
    Unknown,
}

impl SpliceMotif {
    /// Classify a donor/acceptor dinucleotide pair, case-insensitively.
    pub fn classify(donor: &str, acceptor: &str) -> Self {
        let d = donor.to_ascii_uppercase();
        let a = acceptor.to_ascii_uppercase();
        match (d.as_str(), a.as_str()) {
            ("GT", "AG") => SpliceMotif::GtAg,
            ("CT", "AC") => SpliceMotif::CtAc,
            ("GC", "AG") => SpliceMotif::GcAg,
            ("CT", "GC") => SpliceMotif::CtGc,
            ("AT", "AC") => SpliceMotif::AtAc,
            ("GT", "AT") => SpliceMotif::GtAt,
            _ => SpliceMotif::Unknown,
        }
    }

    pub fn spliceosome(self) -> Spliceosome {
        match self {
            SpliceMotif::GtAg | SpliceMotif::CtAc | SpliceMotif::GcAg | SpliceMotif::CtGc => {
                Spliceosome::Major
            }
            SpliceMotif::AtAc | SpliceMotif::GtAt => Spliceosome::Minor,
            SpliceMotif::Unknown => Spliceosome::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, SpliceMotif::Unknown)
    }
}

impl std::fmt::Display for SpliceMotif {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SpliceMotif::GtAg => "GT/AG",
            SpliceMotif::CtAc => "CT/AC",
            SpliceMotif::GcAg => "GC/AG",
            SpliceMotif::CtGc => "CT/GC",
            SpliceMotif::AtAc => "AT/AC",
            SpliceMotif::GtAt => "GT/AT",
            SpliceMotif::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Complement a single base, preserving case. Non-nucleotide characters
/// pass through unchanged.
pub fn complement_base(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        'a' => 't',
        't' => 'a',
        'g' => 'c',
        'c' => 'g',
        other => other,
    }
}

/// Reverse-complement a DNA string, preserving case.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement_base).collect()
}
