// src/lib.rs
// FilmLink - links a personal film log to TMDb and enriches it
//
// Architecture:
// - Domain-centric: matching rules are pure functions over domain types
// - Event-driven: services announce outcomes on the event bus
// - Explicit: nothing is bound without passing the collision guard
// - Local-first: the SQLite store is the source of truth

// ============================================================================
// CORE
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// EXTERNAL CATALOG
// ============================================================================

pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    check_collision,
    classify,
    parse_release_year,
    select,
    select_with_policy,
    title_similarity,
    validate_film,
    // Matching
    CandidateBuckets,
    CandidateResult,
    // Film
    ExternalId,
    Film,
    FilmEnrichment,
    FilmRef,
    FilmReport,
    NamedCount,
    ResolutionOutcome,
    ScoredCandidate,
    SearchPass,
    YearCategory,
    YearCount,
};

// ============================================================================
// PUBLIC API - Configuration & Errors
// ============================================================================

pub use config::{AppConfig, MatchConfig, OtherBucketPolicy, TmdbConfig, UnmatchedPolicy};
pub use error::{AppError, AppResult, TransportError};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    register_review_handlers,
    DomainEvent,
    EnrichmentBatchCompleted,
    EventBus,
    EventLogEntry,
    FilmEnriched,
    FilmLinkedManually,
    FilmRemoved,
    FilmResolved,
    FilmUnlinked,
};

// ============================================================================
// PUBLIC API - Database & Repositories
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

pub use repositories::{BindOutcome, FilmRepository, SqliteFilmRepository};

// ============================================================================
// PUBLIC API - Integrations & Services
// ============================================================================

pub use integrations::{CatalogDetails, CatalogSearch, DetailPayload, TmdbClient};

pub use services::{
    CurationService,
    EnrichmentOptions,
    EnrichmentService,
    EnrichmentSummary,
    FilmDisposition,
    ReportService,
    ResolutionService,
};
