use serde::{Deserialize, Serialize};

/// Outcome of comparing an annotation against one piece of evidence,
/// ordered best to worst.
///
/// The declaration order drives both "worst support wins" folding and
/// best-match selection, and the string spellings are a persisted contract:
/// downstream loaders parse them by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    /// Evidence matches the annotation cleanly.
    Good,
    /// Small indels consistent with polymorphism.
    Polymorphic,
    /// Evidence matches and extends beyond the annotation's outer exons.
    ExtendsExons,
    /// Total indel content of an exon exceeds the fraction limit.
    LargeIndelContent,
    /// A single indel exceeds the size limit.
    LargeIndelSize,
    /// Unaligned RNA bases inside an intron.
    InternalUnaligned,
    /// Exon boundaries disagree.
    FeatMismatch,
    /// Exon counts disagree.
    FeatCountMismatch,
}

impl Support {
    /// The worse of two verdicts.
    #[must_use]
    pub fn worst(self, other: Support) -> Support {
        self.max(other)
    }

    /// Verdicts at or better than this are kept by the aggregator; worse
    /// ones can never corroborate a transcript.
    pub fn is_supporting(self) -> bool {
        self <= Support::ExtendsExons
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Support::Good => "good",
            Support::Polymorphic => "polymorphic",
            Support::ExtendsExons => "extends_exons",
            Support::LargeIndelContent => "large_indel_content",
            Support::LargeIndelSize => "large_indel_size",
            Support::InternalUnaligned => "internal_unaligned",
            Support::FeatMismatch => "feat_mismatch",
            Support::FeatCountMismatch => "feat_count_mismatch",
        }
    }
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_best_to_worst() {
        assert!(Support::Good < Support::Polymorphic);
        assert!(Support::Polymorphic < Support::ExtendsExons);
        assert!(Support::ExtendsExons < Support::LargeIndelContent);
        assert!(Support::LargeIndelContent < Support::LargeIndelSize);
        assert!(Support::LargeIndelSize < Support::InternalUnaligned);
        assert!(Support::InternalUnaligned < Support::FeatMismatch);
        assert!(Support::FeatMismatch < Support::FeatCountMismatch);
    }

    #[test]
    fn test_worst_wins() {
        assert_eq!(Support::Good.worst(Support::Polymorphic), Support::Polymorphic);
        assert_eq!(
            Support::FeatMismatch.worst(Support::ExtendsExons),
            Support::FeatMismatch
        );
    }

    #[test]
    fn test_supporting_threshold() {
        assert!(Support::Good.is_supporting());
        assert!(Support::ExtendsExons.is_supporting());
        assert!(!Support::LargeIndelContent.is_supporting());
    }

    #[test]
    fn test_persisted_spelling() {
        assert_eq!(Support::ExtendsExons.to_string(), "extends_exons");
        assert_eq!(
            serde_json::to_string(&Support::FeatCountMismatch).unwrap(),
            "\"feat_count_mismatch\""
        );
    }
}
