// src/domain/mod.rs
//
// Domain Root
//
// Declares all domain modules and re-exports their public API.
// Other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod film;
pub mod matching;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Film (local record)
pub use film::{
    validate_film, ExternalId, Film, FilmEnrichment, FilmRef, FilmReport, NamedCount, YearCount,
};

// Matching core
pub use matching::{
    check_collision, classify, parse_release_year, select, select_with_policy, title_similarity,
    CandidateBuckets, CandidateResult, OtherBucketPolicy, ResolutionOutcome, ScoredCandidate,
    SearchPass, YearCategory,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Catalog entry {0} has no title")]
    MissingCatalogTitle(i64),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
