// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod curation_service;
pub mod enrichment_service;
pub mod report_service;
pub mod resolution_service;

#[cfg(test)]
mod test_support;


#[cfg(test)]
mod enrichment_service_tests;

#[cfg(test)]
mod curation_service_tests;

pub use curation_service::{unlink_film, CurationService};

pub use enrichment_service::{
    build_enrichment,
    CollisionReport,
    EnrichmentOptions,
    EnrichmentService,
    EnrichmentSummary,
    FilmDisposition,
};

pub use report_service::ReportService;

pub use resolution_service::ResolutionService;
