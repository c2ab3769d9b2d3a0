// src/services/report_service.rs
//
// Report Service
//
// Read-only aggregates over the enriched store for the `stats` view.

use std::sync::Arc;

use crate::domain::FilmReport;
use crate::error::AppResult;
use crate::repositories::FilmRepository;

pub struct ReportService {
    film_repo: Arc<dyn FilmRepository>,
}

impl ReportService {
    pub fn new(film_repo: Arc<dyn FilmRepository>) -> Self {
        Self { film_repo }
    }

    /// Year and genre histograms, the `top_n` most frequent directors and
    /// actors, and total runtime
    pub fn film_report(&self, top_n: usize) -> AppResult<FilmReport> {
        let report = FilmReport {
            by_year: self.film_repo.count_by_year()?,
            by_genre: self.film_repo.count_by_genre()?,
            top_directors: self.film_repo.top_directors(top_n)?,
            top_actors: self.film_repo.top_actors(top_n)?,
            total_runtime_minutes: self.film_repo.total_runtime_minutes()?,
        };

        log::debug!(
            "Report: {} year(s), {} genre(s), {:.1} hours",
            report.by_year.len(),
            report.by_genre.len(),
            report.total_hours()
        );

        Ok(report)
    }
}
