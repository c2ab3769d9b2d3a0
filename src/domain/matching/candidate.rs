// src/domain/matching/candidate.rs
//
// Value objects produced while scoring catalog search results.
// All of them live only for the duration of one resolution attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::film::ExternalId;

// ============================================================================
// CANDIDATE RESULT
// ============================================================================

/// One search hit from the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub external_id: ExternalId,

    /// None when the catalog returned no usable title
    pub title: Option<String>,

    /// Raw release date string as returned by the catalog ("YYYY-MM-DD", "", ...)
    pub release_date: Option<String>,

    /// Catalog popularity, never negative
    pub popularity: f64,

    /// Untouched search hit, handed back to the caller on a match
    pub raw_payload: serde_json::Value,
}

impl CandidateResult {
    pub fn new(
        external_id: ExternalId,
        title: Option<String>,
        release_date: Option<String>,
        popularity: f64,
    ) -> Self {
        Self {
            external_id,
            title,
            release_date,
            popularity: sanitize_popularity(popularity),
            raw_payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, raw_payload: serde_json::Value) -> Self {
        self.raw_payload = raw_payload;
        self
    }
}

fn sanitize_popularity(popularity: f64) -> f64 {
    if popularity.is_finite() && popularity > 0.0 {
        popularity
    } else {
        0.0
    }
}

// ============================================================================
// YEAR CATEGORY
// ============================================================================

/// How a candidate's release year relates to the local record's year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum YearCategory {
    /// Both years known and equal
    Exact,
    /// Both years known, within the allowed distance
    Close { diff: u32 },
    /// Anything else: a year unknown on either side or too far apart
    Other,
}

impl fmt::Display for YearCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearCategory::Exact => write!(f, "exact"),
            YearCategory::Close { diff } => write!(f, "close({})", diff),
            YearCategory::Other => write!(f, "other"),
        }
    }
}

// ============================================================================
// SCORED CANDIDATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: CandidateResult,
    pub release_year: Option<i32>,
    /// Title similarity in [0, 1]
    pub similarity: f64,
    pub year_category: YearCategory,
}

impl ScoredCandidate {
    pub fn external_id(&self) -> ExternalId {
        self.candidate.external_id
    }

    pub fn popularity(&self) -> f64 {
        self.candidate.popularity
    }

    /// Year distance for CLOSE candidates
    pub fn year_diff(&self) -> Option<u32> {
        match self.year_category {
            YearCategory::Close { diff } => Some(diff),
            YearCategory::Exact => Some(0),
            YearCategory::Other => None,
        }
    }
}

// ============================================================================
// CANDIDATE BUCKETS
// ============================================================================

/// Classifier output. Buckets are unsorted; ordering belongs to the selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateBuckets {
    /// Year the buckets were scored against
    pub target_year: Option<i32>,
    pub exact: Vec<ScoredCandidate>,
    pub close: Vec<ScoredCandidate>,
    pub other: Vec<ScoredCandidate>,
}

impl CandidateBuckets {
    pub fn new(target_year: Option<i32>) -> Self {
        Self {
            target_year,
            ..Self::default()
        }
    }

    pub fn push(&mut self, scored: ScoredCandidate) {
        match scored.year_category {
            YearCategory::Exact => self.exact.push(scored),
            YearCategory::Close { .. } => self.close.push(scored),
            YearCategory::Other => self.other.push(scored),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.close.is_empty() && self.other.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.close.len() + self.other.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popularity_is_never_negative() {
        let c = CandidateResult::new(ExternalId(1), Some("X".into()), None, -3.5);
        assert_eq!(c.popularity, 0.0);

        let c = CandidateResult::new(ExternalId(1), Some("X".into()), None, f64::NAN);
        assert_eq!(c.popularity, 0.0);

        let c = CandidateResult::new(ExternalId(1), Some("X".into()), None, 12.25);
        assert_eq!(c.popularity, 12.25);
    }

    #[test]
    fn test_buckets_route_by_category() {
        let mut buckets = CandidateBuckets::new(Some(2000));
        for (id, category) in [
            (1, YearCategory::Exact),
            (2, YearCategory::Close { diff: 1 }),
            (3, YearCategory::Other),
            (4, YearCategory::Other),
        ] {
            buckets.push(ScoredCandidate {
                candidate: CandidateResult::new(ExternalId(id), Some("T".into()), None, 0.0),
                release_year: None,
                similarity: 1.0,
                year_category: category,
            });
        }

        assert_eq!(buckets.exact.len(), 1);
        assert_eq!(buckets.close.len(), 1);
        assert_eq!(buckets.other.len(), 2);
        assert_eq!(buckets.len(), 4);
        assert!(!buckets.is_empty());
        assert!(CandidateBuckets::new(None).is_empty());
    }

    #[test]
    fn test_year_category_display() {
        assert_eq!(YearCategory::Exact.to_string(), "exact");
        assert_eq!(YearCategory::Close { diff: 2 }.to_string(), "close(2)");
        assert_eq!(YearCategory::Other.to_string(), "other");
    }
}
