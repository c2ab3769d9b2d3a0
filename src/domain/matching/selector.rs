// src/domain/matching/selector.rs
//
// Match Selector
//
// Strict priority cascade over the classifier buckets: EXACT, then CLOSE,
// then OTHER. A bucket is consulted only when every earlier one is empty.
// Sorting is stable, so among fully tied candidates the catalog's own order
// wins.

use std::cmp::Ordering;

use super::candidate::{CandidateBuckets, ScoredCandidate};

/// What the selector does when only OTHER-bucket candidates survive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtherBucketPolicy {
    /// Take the best OTHER candidate as a last resort
    #[default]
    Accept,
    /// Decline OTHER-only selections when the local record has a known year
    RejectWhenYearKnown,
}

/// Pick at most one candidate, taking OTHER as a last resort.
pub fn select(buckets: CandidateBuckets) -> Option<ScoredCandidate> {
    select_with_policy(buckets, OtherBucketPolicy::Accept)
}

/// Pick at most one candidate under the given OTHER-bucket policy.
pub fn select_with_policy(
    buckets: CandidateBuckets,
    policy: OtherBucketPolicy,
) -> Option<ScoredCandidate> {
    let CandidateBuckets {
        target_year,
        mut exact,
        mut close,
        mut other,
    } = buckets;

    if !exact.is_empty() {
        exact.sort_by(by_similarity_then_popularity);
        return exact.into_iter().next();
    }

    if !close.is_empty() {
        close.sort_by(|a, b| {
            a.year_diff()
                .cmp(&b.year_diff())
                .then_with(|| by_similarity_then_popularity(a, b))
        });
        return close.into_iter().next();
    }

    if other.is_empty() {
        return None;
    }

    if policy == OtherBucketPolicy::RejectWhenYearKnown && target_year.is_some() {
        log::debug!(
            "Declining {} OTHER-only candidate(s) for known year {:?}",
            other.len(),
            target_year
        );
        return None;
    }

    other.sort_by(by_similarity_then_popularity);
    other.into_iter().next()
}

/// Similarity descending, then popularity descending
fn by_similarity_then_popularity(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.popularity().total_cmp(&a.popularity()))
}
