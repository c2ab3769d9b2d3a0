// src/domain/matching/mod.rs
//
// Entity resolution core: scoring, classification, selection and the
// identity collision guard. Everything here is pure; I/O lives in services.

pub mod candidate;
pub mod classifier;
pub mod collision;
pub mod outcome;
pub mod selector;
pub mod similarity;

pub use candidate::{CandidateBuckets, CandidateResult, ScoredCandidate, YearCategory};
pub use classifier::{classify, parse_release_year, year_category};
pub use collision::check_collision;
pub use outcome::{ResolutionOutcome, SearchPass};
pub use selector::{select, select_with_policy, OtherBucketPolicy};
pub use similarity::title_similarity;
