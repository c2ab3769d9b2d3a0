// src/services/curation_service.rs
//
// Curation Service
//
// Manual operations an operator uses to fix what automatic resolution could
// not: link a film to a known catalog id, drop a binding, or add a film
// straight from the catalog. A catalog id already held by another film is
// never taken over silently; the holder has to be unlinked first.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    check_collision, parse_release_year, validate_film, DomainError, ExternalId, Film,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, FilmLinkedManually, FilmUnlinked};
use crate::integrations::CatalogDetails;
use crate::repositories::{BindOutcome, FilmRepository};
use crate::services::enrichment_service::{build_enrichment, EnrichmentOptions};

pub struct CurationService {
    details: Arc<dyn CatalogDetails>,
    film_repo: Arc<dyn FilmRepository>,
    event_bus: Arc<EventBus>,
    options: EnrichmentOptions,
}

impl CurationService {
    pub fn new(
        details: Arc<dyn CatalogDetails>,
        film_repo: Arc<dyn FilmRepository>,
        event_bus: Arc<EventBus>,
        options: EnrichmentOptions,
    ) -> Self {
        Self {
            details,
            film_repo,
            event_bus,
            options,
        }
    }

    /// Bind an existing film to a catalog id chosen by hand
    pub async fn link(&self, film_id: Uuid, tmdb_id: ExternalId) -> AppResult<Film> {
        let film = self
            .film_repo
            .get_by_id(film_id)?
            .ok_or(AppError::NotFound)?;

        if let Some(holder) =
            check_collision(tmdb_id, &film, |id| self.film_repo.find_by_tmdb_id(id))?
        {
            return Err(already_linked(tmdb_id, &holder.to_string()));
        }

        let details = self.details.fetch_details(tmdb_id).await?;
        let enrichment = build_enrichment(&details, &self.options);

        match self
            .film_repo
            .bind_enrichment(film.id, tmdb_id, &enrichment)?
        {
            BindOutcome::Bound => {}
            BindOutcome::Collision(holder) => {
                return Err(already_linked(tmdb_id, &holder.to_string()));
            }
        }

        self.event_bus
            .emit(FilmLinkedManually::new(film.id, tmdb_id.value(), false));

        self.film_repo.get_by_id(film.id)?.ok_or(AppError::NotFound)
    }

    /// Remove a film's catalog binding and enrichment
    pub fn unlink(&self, film_id: Uuid) -> AppResult<()> {
        unlink_film(self.film_repo.as_ref(), &self.event_bus, film_id).map(|_| ())
    }

    /// Create a fully enriched film from a catalog id
    pub async fn add(&self, tmdb_id: ExternalId) -> AppResult<Film> {
        if let Some(holder) = self.film_repo.find_by_tmdb_id(tmdb_id)? {
            return Err(already_linked(tmdb_id, &holder.film_ref().to_string()));
        }

        let details = self.details.fetch_details(tmdb_id).await?;
        let title = details
            .title
            .clone()
            .ok_or(DomainError::MissingCatalogTitle(tmdb_id.value()))?;
        let year = parse_release_year(details.release_date.as_deref());

        let mut film = Film::new(Film::placeholder_uri(tmdb_id), title, year);
        film.bind(tmdb_id, build_enrichment(&details, &self.options));
        validate_film(&film)?;

        self.film_repo.save(&film)?;
        self.event_bus
            .emit(FilmLinkedManually::new(film.id, tmdb_id.value(), true));

        log::info!("Added '{}' ({:?}) from TMDb {}", film.title, film.year, tmdb_id);
        Ok(film)
    }
}

/// Clear a film's binding without a catalog client; returns the film as it
/// was before the unlink.
pub fn unlink_film(
    film_repo: &dyn FilmRepository,
    event_bus: &EventBus,
    film_id: Uuid,
) -> AppResult<Film> {
    let film = film_repo.get_by_id(film_id)?.ok_or(AppError::NotFound)?;

    film_repo.clear_binding(film.id)?;
    event_bus.emit(FilmUnlinked::new(film.id, film.tmdb_id.map(|t| t.value())));

    Ok(film)
}

fn already_linked(tmdb_id: ExternalId, holder: &str) -> AppError {
    AppError::Conflict(format!(
        "TMDb {} is already linked to {}; unlink it first",
        tmdb_id, holder
    ))
}
