// src/services/enrichment_service_tests.rs
//
// Batch enrichment against a real SQLite store and a scripted catalog.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::config::{MatchConfig, UnmatchedPolicy};
    use crate::domain::{ExternalId, Film};
    use crate::error::{AppError, TransportError};
    use crate::events::EventBus;
    use crate::repositories::{FilmRepository, SqliteFilmRepository};
    use crate::services::enrichment_service::{
        build_enrichment, EnrichmentOptions, EnrichmentService, FilmDisposition,
    };
    use crate::services::resolution_service::ResolutionService;
    use crate::services::test_support::{full_details, hit, temp_repo, FakeCatalog};

    struct Harness {
        _dir: TempDir,
        repo: Arc<SqliteFilmRepository>,
        bus: Arc<EventBus>,
        catalog: Arc<FakeCatalog>,
        service: EnrichmentService,
    }

    fn harness(catalog: FakeCatalog, policy: UnmatchedPolicy) -> Harness {
        let (dir, repo) = temp_repo();
        let bus = Arc::new(EventBus::new());
        let catalog = Arc::new(catalog);

        let resolver = Arc::new(ResolutionService::new(
            catalog.clone(),
            repo.clone(),
            Arc::clone(&bus),
            MatchConfig::default(),
        ));
        let options = EnrichmentOptions {
            unmatched_policy: policy,
            ..EnrichmentOptions::default()
        };
        let service = EnrichmentService::new(
            resolver,
            catalog.clone(),
            repo.clone(),
            Arc::clone(&bus),
            options,
        );

        Harness {
            _dir: dir,
            repo,
            bus,
            catalog,
            service,
        }
    }

    fn stored(repo: &SqliteFilmRepository, uri: &str, title: &str, year: Option<i32>) -> Film {
        let film = Film::new(uri.to_string(), title.to_string(), year);
        repo.save(&film).unwrap();
        film
    }

    fn event_types(bus: &EventBus) -> Vec<String> {
        bus.get_event_log().into_iter().map(|e| e.event_type).collect()
    }

    #[tokio::test]
    async fn test_matched_film_is_bound_and_enriched() {
        let h = harness(
            FakeCatalog::new()
                .with_search("Alien", Some(1979), vec![hit(348, "Alien", "1979-05-25", 60.0)])
                .with_details(full_details(348, "Alien", "1979-05-25")),
            UnmatchedPolicy::Delete,
        );
        let film = stored(&h.repo, "https://boxd.it/alien", "Alien", Some(1979));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.updated, 1);

        let reloaded = h.repo.get_by_id(film.id).unwrap().unwrap();
        assert_eq!(reloaded.tmdb_id, Some(ExternalId(348)));
        assert_eq!(reloaded.enrichment.poster_path.as_deref(), Some("/348.jpg"));
        assert_eq!(reloaded.enrichment.actors, Some(vec!["Lead Actor".to_string()]));
        assert!(!reloaded.needs_enrichment());
        assert!(h.repo.list_pending(None).unwrap().is_empty());

        assert_eq!(
            event_types(&h.bus),
            vec!["FilmResolved", "FilmEnriched", "EnrichmentBatchCompleted"]
        );
    }

    #[tokio::test]
    async fn test_unmatched_film_is_deleted_by_default() {
        let h = harness(FakeCatalog::new(), UnmatchedPolicy::Delete);
        let film = stored(&h.repo, "https://boxd.it/ghost", "Ghost Film", Some(2001));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.deleted, 1);
        assert!(h.repo.get_by_id(film.id).unwrap().is_none());
        assert!(event_types(&h.bus).contains(&"FilmRemoved".to_string()));
    }

    #[tokio::test]
    async fn test_unmatched_film_is_kept_under_keep_policy() {
        let h = harness(FakeCatalog::new(), UnmatchedPolicy::Keep);
        let film = stored(&h.repo, "https://boxd.it/ghost", "Ghost Film", Some(2001));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.kept_unmatched, 1);
        assert_eq!(summary.deleted, 0);
        let reloaded = h.repo.get_by_id(film.id).unwrap().unwrap();
        assert_eq!(reloaded.tmdb_id, None);
    }

    #[tokio::test]
    async fn test_collision_leaves_both_films_untouched() {
        let h = harness(
            FakeCatalog::new()
                .with_search("Solaris", Some(1972), vec![hit(593, "Solaris", "1972-03-20", 15.0)])
                .with_details(full_details(593, "Solaris", "1972-03-20")),
            UnmatchedPolicy::Delete,
        );

        let mut holder = Film::new("https://boxd.it/solaris-a".into(), "Solaris".into(), Some(1972));
        holder.bind(
            ExternalId(593),
            build_enrichment(&full_details(593, "Solaris", "1972-03-20"), &EnrichmentOptions::default()),
        );
        h.repo.save(&holder).unwrap();
        let dup = stored(&h.repo, "https://boxd.it/solaris-b", "Solaris", Some(1972));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.collisions, 1);
        assert_eq!(summary.collision_reports[0].film.id, dup.id);
        assert_eq!(summary.collision_reports[0].conflicting.id, holder.id);
        assert_eq!(summary.collision_reports[0].external_id, ExternalId(593));

        // not deleted, not bound
        let reloaded = h.repo.get_by_id(dup.id).unwrap().unwrap();
        assert_eq!(reloaded.tmdb_id, None);
        assert_eq!(
            h.repo.find_by_tmdb_id(ExternalId(593)).unwrap().map(|f| f.id),
            Some(holder.id)
        );
        assert!(h.catalog.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_same_run_second_claim_is_collision() {
        let h = harness(
            FakeCatalog::new()
                .with_search("Solaris", Some(1972), vec![hit(593, "Solaris", "1972-03-20", 15.0)])
                .with_details(full_details(593, "Solaris", "1972-03-20")),
            UnmatchedPolicy::Delete,
        );
        let first = stored(&h.repo, "https://boxd.it/solaris-a", "Solaris", Some(1972));
        let second = stored(&h.repo, "https://boxd.it/solaris-b", "Solaris", Some(1972));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.collisions, 1);
        assert_eq!(summary.deleted, 0);

        let a = h.repo.get_by_id(first.id).unwrap().unwrap();
        let b = h.repo.get_by_id(second.id).unwrap().unwrap();
        let (winner, loser) = if a.tmdb_id.is_some() { (a, b) } else { (b, a) };
        assert_eq!(winner.tmdb_id, Some(ExternalId(593)));
        assert_eq!(loser.tmdb_id, None);
        assert_eq!(summary.collision_reports[0].film.id, loser.id);
        assert_eq!(summary.collision_reports[0].conflicting.id, winner.id);

        // the loser stays pending and collides again on every run
        let rerun = h.service.enrich_pending(None).await.unwrap();
        assert_eq!(rerun.total, 1);
        assert_eq!(rerun.updated, 0);
        assert_eq!(rerun.collisions, 1);
        assert_eq!(
            h.repo.find_by_tmdb_id(ExternalId(593)).unwrap().map(|f| f.id),
            Some(winner.id)
        );
    }

    #[tokio::test]
    async fn test_transport_failure_skips_film_and_continues() {
        let h = harness(
            FakeCatalog::new()
                .with_search_error("Broken", Some(2000), TransportError::Network("timeout".into()))
                .with_search("Heat", Some(1995), vec![hit(949, "Heat", "1995-12-15", 40.0)])
                .with_details(full_details(949, "Heat", "1995-12-15")),
            UnmatchedPolicy::Delete,
        );
        let broken = stored(&h.repo, "https://boxd.it/broken", "Broken", Some(2000));
        let heat = stored(&h.repo, "https://boxd.it/heat", "Heat", Some(1995));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failures[0].0.id, broken.id);

        // a failed lookup is never treated as "no match"
        assert!(h.repo.get_by_id(broken.id).unwrap().is_some());
        assert_eq!(
            h.repo.get_by_id(heat.id).unwrap().unwrap().tmdb_id,
            Some(ExternalId(949))
        );
    }

    #[tokio::test]
    async fn test_details_failure_leaves_film_pending() {
        let h = harness(
            FakeCatalog::new()
                .with_search("Heat", Some(1995), vec![hit(949, "Heat", "1995-12-15", 40.0)])
                .with_details_error(ExternalId(949), TransportError::RateLimited),
            UnmatchedPolicy::Delete,
        );
        let heat = stored(&h.repo, "https://boxd.it/heat", "Heat", Some(1995));

        let summary = h.service.enrich_pending(None).await.unwrap();

        assert_eq!(summary.failed, 1);
        let reloaded = h.repo.get_by_id(heat.id).unwrap().unwrap();
        assert_eq!(reloaded.tmdb_id, None);
        assert_eq!(h.repo.list_pending(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enrich_film_reports_disposition() {
        let h = harness(
            FakeCatalog::new()
                .with_search("Heat", None, vec![hit(949, "Heat", "1995-12-15", 40.0)])
                .with_details(full_details(949, "Heat", "1995-12-15")),
            UnmatchedPolicy::Keep,
        );
        let heat = stored(&h.repo, "https://boxd.it/heat", "Heat", None);
        let other = stored(&h.repo, "https://boxd.it/other", "Unknown Thing", None);

        assert_eq!(
            h.service.enrich_film(&heat).await.unwrap(),
            FilmDisposition::Updated(ExternalId(949))
        );
        assert_eq!(
            h.service.enrich_film(&other).await.unwrap(),
            FilmDisposition::KeptUnmatched
        );
    }

    #[tokio::test]
    async fn test_limit_caps_batch_size() {
        let h = harness(FakeCatalog::new(), UnmatchedPolicy::Keep);
        for i in 0..4 {
            stored(&h.repo, &format!("https://boxd.it/{}", i), &format!("Film {}", i), None);
        }

        let summary = h.service.enrich_pending(Some(3)).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.kept_unmatched, 3);
        assert_eq!(h.catalog.search_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_film_on_delete_counts_as_failure() {
        let h = harness(FakeCatalog::new(), UnmatchedPolicy::Delete);
        let film = Film::new("https://boxd.it/gone".into(), "Gone".into(), None);

        // never stored, so delete reports NotFound
        let result = h.service.enrich_film(&film).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
