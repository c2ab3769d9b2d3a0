// src/domain/matching/classifier.rs
//
// Candidate Classifier
//
// Scores catalog search hits against a local title and partitions the ones
// that pass the similarity gate into EXACT / CLOSE / OTHER year buckets.
// Candidates below the gate are dropped entirely. Malformed hits (no title,
// unparsable date) never abort classification.

use super::candidate::{CandidateBuckets, CandidateResult, ScoredCandidate, YearCategory};
use super::similarity::title_similarity;

/// Leading four-digit year of a catalog release date ("1999-03-31" -> 1999).
/// Anything else, including an empty string, yields None.
pub fn parse_release_year(release_date: Option<&str>) -> Option<i32> {
    let token = release_date?.trim().split('-').next()?;
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

/// Relationship between the local year and a candidate year
pub fn year_category(
    target_year: Option<i32>,
    candidate_year: Option<i32>,
    year_diff_threshold: u32,
) -> YearCategory {
    match (target_year, candidate_year) {
        (Some(target), Some(candidate)) => {
            let diff = target.abs_diff(candidate);
            if diff == 0 {
                YearCategory::Exact
            } else if diff <= year_diff_threshold {
                YearCategory::Close { diff }
            } else {
                YearCategory::Other
            }
        }
        _ => YearCategory::Other,
    }
}

/// Score and bucket search results.
pub fn classify<I>(
    results: I,
    target_title: &str,
    target_year: Option<i32>,
    similarity_threshold: f64,
    year_diff_threshold: u32,
) -> CandidateBuckets
where
    I: IntoIterator<Item = CandidateResult>,
{
    let mut buckets = CandidateBuckets::new(target_year);

    for candidate in results {
        let similarity = match candidate.title.as_deref() {
            Some(title) => title_similarity(target_title, title),
            None => {
                log::trace!("Dropping candidate {}: no title", candidate.external_id);
                continue;
            }
        };

        if similarity < similarity_threshold {
            log::trace!(
                "Dropping candidate {}: similarity {:.3} below {:.3}",
                candidate.external_id,
                similarity,
                similarity_threshold
            );
            continue;
        }

        let release_year = parse_release_year(candidate.release_date.as_deref());
        let category = year_category(target_year, release_year, year_diff_threshold);

        buckets.push(ScoredCandidate {
            candidate,
            release_year,
            similarity,
            year_category: category,
        });
    }

    buckets
}
