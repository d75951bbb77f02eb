use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A non-fatal document-quality problem found during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuotationMarkResolutionIssue {
    /// An opening mark never closes, or a closing mark has no opener
    UnpairedQuotationMark,
    /// Nesting went past the maximum supported depth
    TooDeepNesting,
    /// A mark does not fit the active convention at its position
    IncompatibleQuotationMark,
    /// A mark's direction could not be determined
    AmbiguousQuotationMark,
}

impl fmt::Display for QuotationMarkResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnpairedQuotationMark => "unpaired quotation mark",
            Self::TooDeepNesting => "too deep nesting",
            Self::IncompatibleQuotationMark => "incompatible quotation mark",
            Self::AmbiguousQuotationMark => "ambiguous quotation mark",
        };
        f.write_str(name)
    }
}

/// Distinct issues in the order they were first recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSet {
    issues: SmallVec<[QuotationMarkResolutionIssue; 4]>,
}

impl IssueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue; returns false if it was already present
    pub fn insert(&mut self, issue: QuotationMarkResolutionIssue) -> bool {
        if self.contains(issue) {
            return false;
        }
        tracing::trace!(%issue, "quotation mark resolution issue");
        self.issues.push(issue);
        true
    }

    pub fn contains(&self, issue: QuotationMarkResolutionIssue) -> bool {
        self.issues.contains(&issue)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = QuotationMarkResolutionIssue> + '_ {
        self.issues.iter().copied()
    }

    /// Add every issue of `other` that is not yet present
    pub fn extend_from(&mut self, other: &IssueSet) {
        for issue in other.iter() {
            self.insert(issue);
        }
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }

    pub fn to_vec(&self) -> Vec<QuotationMarkResolutionIssue> {
        self.issues.to_vec()
    }
}

impl FromIterator<QuotationMarkResolutionIssue> for IssueSet {
    fn from_iter<T: IntoIterator<Item = QuotationMarkResolutionIssue>>(iter: T) -> Self {
        let mut set = Self::new();
        for issue in iter {
            set.insert(issue);
        }
        set
    }
}
