// src/services/resolution_service.rs
//
// Resolution Service
//
// Decides which catalog entry (if any) a local film is.
//
// RULES:
// - Pass A searches title + year and runs only when the year is known
// - Pass B searches title only, still scoring against the local year
// - One search call per pass, no retries; a failed call is an error, never
//   "zero candidates"
// - The collision guard runs before any Matched outcome is returned
// - Never writes to the store; binding and disposal belong to the caller

use std::sync::Arc;

use crate::config::MatchConfig;
use crate::domain::{
    check_collision, classify, select_with_policy, Film, ResolutionOutcome, ScoredCandidate,
    SearchPass,
};
use crate::error::AppResult;
use crate::events::{EventBus, FilmResolved};
use crate::integrations::CatalogSearch;
use crate::repositories::FilmRepository;

// ============================================================================
// RESOLUTION SERVICE
// ============================================================================

pub struct ResolutionService {
    catalog: Arc<dyn CatalogSearch>,
    film_repo: Arc<dyn FilmRepository>,
    event_bus: Arc<EventBus>,
    config: MatchConfig,
}

impl ResolutionService {
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        film_repo: Arc<dyn FilmRepository>,
        event_bus: Arc<EventBus>,
        config: MatchConfig,
    ) -> Self {
        Self {
            catalog,
            film_repo,
            event_bus,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Resolve one film against the catalog.
    ///
    /// Returns `Err(AppError::Transport)` when a search call fails; every other
    /// result is a terminal outcome and is announced on the event bus.
    pub async fn resolve(&self, film: &Film) -> AppResult<ResolutionOutcome> {
        let outcome = self.resolve_internal(film).await?;

        match &outcome {
            ResolutionOutcome::Matched {
                external_id, pass, ..
            } => log::info!(
                "'{}' ({:?}) matched TMDb {} via {} search",
                film.title,
                film.year,
                external_id,
                pass
            ),
            ResolutionOutcome::NoMatch => {
                log::info!("'{}' ({:?}) has no catalog match", film.title, film.year)
            }
            ResolutionOutcome::Collision {
                external_id,
                conflicting,
            } => log::warn!(
                "'{}' matched TMDb {} which is already bound to {}",
                film.title,
                external_id,
                conflicting
            ),
        }

        self.event_bus
            .emit(FilmResolved::from_outcome(film, &outcome));

        Ok(outcome)
    }

    /// Two-pass search and selection, without the collision guard.
    ///
    /// Used by `resolve` and by the dry-run preview, which has no stored film.
    pub async fn find_candidate(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> AppResult<Option<(ScoredCandidate, SearchPass)>> {
        if let Some(y) = year {
            if let Some(selected) = self
                .run_pass(title, year, Some(y), SearchPass::TitleAndYear)
                .await?
            {
                return Ok(Some((selected, SearchPass::TitleAndYear)));
            }
        }

        let selected = self
            .run_pass(title, year, None, SearchPass::TitleOnly)
            .await?;

        Ok(selected.map(|s| (s, SearchPass::TitleOnly)))
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    async fn resolve_internal(&self, film: &Film) -> AppResult<ResolutionOutcome> {
        let Some((selected, pass)) = self.find_candidate(&film.title, film.year).await? else {
            return Ok(ResolutionOutcome::NoMatch);
        };

        let external_id = selected.external_id();

        if let Some(conflicting) = check_collision(external_id, film, |id| {
            self.film_repo.find_by_tmdb_id(id)
        })? {
            return Ok(ResolutionOutcome::Collision {
                external_id,
                conflicting,
            });
        }

        Ok(ResolutionOutcome::Matched {
            external_id,
            payload: selected.candidate.raw_payload,
            pass,
            similarity: selected.similarity,
        })
    }

    /// One search call, then classify and select
    async fn run_pass(
        &self,
        title: &str,
        target_year: Option<i32>,
        query_year: Option<i32>,
        pass: SearchPass,
    ) -> AppResult<Option<ScoredCandidate>> {
        let results = self.catalog.search_movies(title, query_year).await?;
        let result_count = results.len();

        let buckets = classify(
            results,
            title,
            target_year,
            self.config.similarity_threshold,
            self.config.year_diff_threshold,
        );

        log::debug!(
            "{} pass for '{}': {} results, {} exact / {} close / {} other",
            pass,
            title,
            result_count,
            buckets.exact.len(),
            buckets.close.len(),
            buckets.other.len()
        );

        let selected = select_with_policy(buckets, self.config.other_bucket_policy);

        if let Some(s) = &selected {
            log::debug!(
                "{} pass selected TMDb {} ({}, similarity {:.3}, popularity {:.1})",
                pass,
                s.external_id(),
                s.year_category,
                s.similarity,
                s.popularity()
            );
        }

        Ok(selected)
    }
}
