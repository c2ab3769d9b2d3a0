// src/services/enrichment_service.rs
//
// Enrichment Service
//
// Batch runner over films awaiting enrichment. For every film it asks the
// ResolutionService for an outcome and then applies the disposal policy:
//
// - Matched   -> fetch details, bind + enrich (atomic with the collision check)
// - NoMatch   -> delete or keep, per UnmatchedPolicy
// - Collision -> leave both films untouched, report for manual review
// - Transport failure -> count it and move on to the next film

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, UnmatchedPolicy, DEFAULT_TMDB_IMAGE_BASE_URL, DEFAULT_TMDB_PROFILE_SIZE};
use crate::domain::{ExternalId, Film, FilmEnrichment, FilmRef, ResolutionOutcome};
use crate::error::{AppError, AppResult};
use crate::events::{EnrichmentBatchCompleted, EventBus, FilmEnriched, FilmRemoved};
use crate::integrations::{CatalogDetails, DetailPayload};
use crate::repositories::{BindOutcome, FilmRepository};
use crate::services::resolution_service::ResolutionService;

// ============================================================================
// OPTIONS & RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOptions {
    /// Billed cast members copied onto a film
    pub top_actor_count: usize,
    /// Prefix for actor portrait URLs (image base + size)
    pub profile_base_url: String,
    pub unmatched_policy: UnmatchedPolicy,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            top_actor_count: 5,
            profile_base_url: format!(
                "{}{}",
                DEFAULT_TMDB_IMAGE_BASE_URL, DEFAULT_TMDB_PROFILE_SIZE
            ),
            unmatched_policy: UnmatchedPolicy::Delete,
        }
    }
}

impl EnrichmentOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_actor_count: config.matching.top_actor_count,
            profile_base_url: config.tmdb.profile_url(""),
            unmatched_policy: config.unmatched_policy,
        }
    }
}

/// What happened to one film during a run
#[derive(Debug, Clone, PartialEq)]
pub enum FilmDisposition {
    Updated(ExternalId),
    Deleted,
    KeptUnmatched,
    Collision {
        external_id: ExternalId,
        conflicting: FilmRef,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionReport {
    pub film: FilmRef,
    pub external_id: ExternalId,
    pub conflicting: FilmRef,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub updated: usize,
    pub deleted: usize,
    pub kept_unmatched: usize,
    pub collisions: usize,
    pub failed: usize,
    /// Films left untouched because their match is held elsewhere
    pub collision_reports: Vec<CollisionReport>,
    /// Films that could not be processed, with the reason
    pub failures: Vec<(FilmRef, String)>,
}

// ============================================================================
// ENRICHMENT SERVICE
// ============================================================================

pub struct EnrichmentService {
    resolver: Arc<ResolutionService>,
    details: Arc<dyn CatalogDetails>,
    film_repo: Arc<dyn FilmRepository>,
    event_bus: Arc<EventBus>,
    options: EnrichmentOptions,
}

impl EnrichmentService {
    pub fn new(
        resolver: Arc<ResolutionService>,
        details: Arc<dyn CatalogDetails>,
        film_repo: Arc<dyn FilmRepository>,
        event_bus: Arc<EventBus>,
        options: EnrichmentOptions,
    ) -> Self {
        Self {
            resolver,
            details,
            film_repo,
            event_bus,
            options,
        }
    }

    /// Process pending films one at a time, oldest first.
    ///
    /// Transport failures are per-film; storage failures abort the run.
    pub async fn enrich_pending(&self, limit: Option<usize>) -> AppResult<EnrichmentSummary> {
        let start_time = Instant::now();
        let films = self.film_repo.list_pending(limit)?;

        let mut summary = EnrichmentSummary {
            total: films.len(),
            ..EnrichmentSummary::default()
        };
        log::info!("Found {} film(s) to process", summary.total);

        for (idx, film) in films.iter().enumerate() {
            log::info!(
                "[{}/{}] '{}' ({})",
                idx + 1,
                summary.total,
                film.title,
                film.year.map(|y| y.to_string()).unwrap_or_else(|| "year unknown".into())
            );

            match self.enrich_film(film).await {
                Ok(FilmDisposition::Updated(_)) => summary.updated += 1,
                Ok(FilmDisposition::Deleted) => summary.deleted += 1,
                Ok(FilmDisposition::KeptUnmatched) => summary.kept_unmatched += 1,
                Ok(FilmDisposition::Collision {
                    external_id,
                    conflicting,
                }) => {
                    summary.collisions += 1;
                    summary.collision_reports.push(CollisionReport {
                        film: film.film_ref(),
                        external_id,
                        conflicting,
                    });
                }
                Err(e) if e.is_transport() || matches!(e, AppError::NotFound) => {
                    log::warn!("Skipping '{}': {}", film.title, e);
                    summary.failed += 1;
                    summary.failures.push((film.film_ref(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        log::info!(
            "Enrichment complete: updated {}, deleted {}, kept {}, collisions {}, failed {}, total {}",
            summary.updated,
            summary.deleted,
            summary.kept_unmatched,
            summary.collisions,
            summary.failed,
            summary.total
        );

        self.event_bus.emit(EnrichmentBatchCompleted::new(
            summary.total,
            summary.updated,
            summary.deleted,
            summary.kept_unmatched,
            summary.collisions,
            summary.failed,
            duration_ms,
        ));

        Ok(summary)
    }

    /// Resolve one film and apply the disposal policy to the outcome
    pub async fn enrich_film(&self, film: &Film) -> AppResult<FilmDisposition> {
        match self.resolver.resolve(film).await? {
            ResolutionOutcome::Matched { external_id, .. } => {
                let details = self.details.fetch_details(external_id).await?;
                let enrichment = build_enrichment(&details, &self.options);

                match self
                    .film_repo
                    .bind_enrichment(film.id, external_id, &enrichment)?
                {
                    BindOutcome::Bound => {
                        log::info!(
                            "Updated '{}' with TMDb {}: {} director(s), {} actor(s)",
                            film.title,
                            external_id,
                            enrichment.directors.as_ref().map_or(0, Vec::len),
                            enrichment.actors.as_ref().map_or(0, Vec::len)
                        );
                        self.event_bus.emit(FilmEnriched::new(
                            film.id,
                            external_id.value(),
                            film.title.clone(),
                        ));
                        Ok(FilmDisposition::Updated(external_id))
                    }
                    BindOutcome::Collision(conflicting) => {
                        log::warn!(
                            "TMDb {} was bound to {} before '{}' could claim it",
                            external_id,
                            conflicting,
                            film.title
                        );
                        Ok(FilmDisposition::Collision {
                            external_id,
                            conflicting,
                        })
                    }
                }
            }
            ResolutionOutcome::NoMatch => match self.options.unmatched_policy {
                UnmatchedPolicy::Delete => {
                    self.film_repo.delete(film.id)?;
                    self.event_bus.emit(FilmRemoved::new(
                        film.id,
                        film.letterboxd_uri.clone(),
                        film.title.clone(),
                    ));
                    Ok(FilmDisposition::Deleted)
                }
                UnmatchedPolicy::Keep => Ok(FilmDisposition::KeptUnmatched),
            },
            ResolutionOutcome::Collision {
                external_id,
                conflicting,
            } => Ok(FilmDisposition::Collision {
                external_id,
                conflicting,
            }),
        }
    }
}

// ============================================================================
// DETAIL MAPPING
// ============================================================================

/// Build the stored enrichment from a catalog detail payload.
///
/// Empty lists are stored as absent. Actor portraits stay positionally
/// aligned with actor names. A release date that is not YYYY-MM-DD is dropped.
pub fn build_enrichment(details: &DetailPayload, options: &EnrichmentOptions) -> FilmEnrichment {
    let top_cast = &details.cast[..details.cast.len().min(options.top_actor_count)];

    let actors: Vec<String> = top_cast.iter().map(|c| c.name.clone()).collect();
    let profiles: Vec<Option<String>> = top_cast
        .iter()
        .map(|c| {
            c.profile_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", options.profile_base_url, p))
        })
        .collect();

    let release_date = details.release_date.as_deref().and_then(|raw| {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                log::warn!("Invalid release date '{}' for TMDb {}", raw, details.external_id);
                None
            }
        }
    });

    FilmEnrichment {
        directors: non_empty(details.directors.clone()),
        actors: non_empty(actors),
        actor_profile_paths: non_empty(profiles),
        poster_path: details.poster_path.clone(),
        backdrop_path: details.backdrop_path.clone(),
        runtime: details.runtime,
        genres: non_empty(details.genres.clone()),
        release_date,
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
