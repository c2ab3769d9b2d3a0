// src/services/curation_service_tests.rs
//
// Manual link / unlink / add against a real SQLite store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::domain::{DomainError, ExternalId, Film};
    use crate::error::{AppError, TransportError};
    use crate::events::{EventBus, FilmLinkedManually};
    use crate::integrations::DetailPayload;
    use crate::repositories::{FilmRepository, SqliteFilmRepository};
    use crate::services::curation_service::{unlink_film, CurationService};
    use crate::services::enrichment_service::EnrichmentOptions;
    use crate::services::test_support::{full_details, temp_repo, FakeCatalog};

    fn setup(catalog: FakeCatalog) -> (TempDir, Arc<SqliteFilmRepository>, Arc<EventBus>, CurationService) {
        let (dir, repo) = temp_repo();
        let bus = Arc::new(EventBus::new());
        let service = CurationService::new(
            Arc::new(catalog),
            repo.clone(),
            Arc::clone(&bus),
            EnrichmentOptions::default(),
        );
        (dir, repo, bus, service)
    }

    fn stored(repo: &SqliteFilmRepository, uri: &str, title: &str) -> Film {
        let film = Film::new(uri.to_string(), title.to_string(), Some(1972));
        repo.save(&film).unwrap();
        film
    }

    #[tokio::test]
    async fn test_link_binds_and_enriches() {
        let (_dir, repo, bus, service) =
            setup(FakeCatalog::new().with_details(full_details(593, "Solaris", "1972-03-20")));
        let film = stored(&repo, "https://boxd.it/solaris", "Solaris");

        let linked = service.link(film.id, ExternalId(593)).await.unwrap();

        assert_eq!(linked.id, film.id);
        assert_eq!(linked.tmdb_id, Some(ExternalId(593)));
        assert!(linked.enrichment.is_complete());
        assert_eq!(bus.get_event_log()[0].event_type, "FilmLinkedManually");
    }

    #[tokio::test]
    async fn test_link_refuses_id_held_by_another_film() {
        let (_dir, repo, _bus, service) =
            setup(FakeCatalog::new().with_details(full_details(593, "Solaris", "1972-03-20")));
        let a = stored(&repo, "https://boxd.it/a", "Solaris");
        let b = stored(&repo, "https://boxd.it/b", "Solaris");
        service.link(a.id, ExternalId(593)).await.unwrap();

        let result = service.link(b.id, ExternalId(593)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(repo.get_by_id(b.id).unwrap().unwrap().tmdb_id, None);
        assert_eq!(
            repo.find_by_tmdb_id(ExternalId(593)).unwrap().map(|f| f.id),
            Some(a.id)
        );
    }

    #[tokio::test]
    async fn test_relinking_own_id_is_allowed() {
        let (_dir, repo, _bus, service) =
            setup(FakeCatalog::new().with_details(full_details(593, "Solaris", "1972-03-20")));
        let a = stored(&repo, "https://boxd.it/a", "Solaris");

        service.link(a.id, ExternalId(593)).await.unwrap();
        let again = service.link(a.id, ExternalId(593)).await.unwrap();

        assert_eq!(again.tmdb_id, Some(ExternalId(593)));
    }

    #[tokio::test]
    async fn test_link_unknown_film_is_not_found() {
        let (_dir, _repo, _bus, service) = setup(FakeCatalog::new());

        let result = service.link(Uuid::new_v4(), ExternalId(1)).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_unlink_frees_id_for_another_film() {
        let (_dir, repo, bus, service) =
            setup(FakeCatalog::new().with_details(full_details(593, "Solaris", "1972-03-20")));
        let a = stored(&repo, "https://boxd.it/a", "Solaris");
        let b = stored(&repo, "https://boxd.it/b", "Solaris");
        service.link(a.id, ExternalId(593)).await.unwrap();

        service.unlink(a.id).unwrap();

        let cleared = repo.get_by_id(a.id).unwrap().unwrap();
        assert_eq!(cleared.tmdb_id, None);
        assert!(cleared.enrichment.poster_path.is_none());
        assert!(bus
            .get_event_log()
            .iter()
            .any(|e| e.event_type == "FilmUnlinked"));

        service.link(b.id, ExternalId(593)).await.unwrap();
    }

    #[test]
    fn test_unlink_film_without_catalog_client() {
        let (_dir, repo) = temp_repo();
        let bus = EventBus::new();
        let mut film = Film::new("https://boxd.it/solaris".into(), "Solaris".into(), Some(1972));
        film.bind(
            ExternalId(593),
            crate::services::enrichment_service::build_enrichment(
                &full_details(593, "Solaris", "1972-03-20"),
                &EnrichmentOptions::default(),
            ),
        );
        repo.save(&film).unwrap();

        let previous = unlink_film(repo.as_ref(), &bus, film.id).unwrap();

        assert_eq!(previous.tmdb_id, Some(ExternalId(593)));
        assert_eq!(repo.get_by_id(film.id).unwrap().unwrap().tmdb_id, None);
        assert_eq!(bus.get_event_log()[0].event_type, "FilmUnlinked");
        assert!(matches!(
            unlink_film(repo.as_ref(), &bus, Uuid::new_v4()),
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_add_creates_placeholder_film() {
        let (_dir, repo, bus, service) =
            setup(FakeCatalog::new().with_details(full_details(603, "The Matrix", "1999-03-30")));

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        bus.subscribe::<FilmLinkedManually, _>(move |e| seen_clone.lock().unwrap().push(e.clone()));

        let film = service.add(ExternalId(603)).await.unwrap();

        assert_eq!(film.letterboxd_uri, "tmdb_entry_placeholder_603");
        assert_eq!(film.title, "The Matrix");
        assert_eq!(film.year, Some(1999));

        let reloaded = repo.get_by_uri("tmdb_entry_placeholder_603").unwrap().unwrap();
        assert_eq!(reloaded.id, film.id);
        assert_eq!(reloaded.tmdb_id, Some(ExternalId(603)));
        assert!(seen.lock().unwrap()[0].created);
    }

    #[tokio::test]
    async fn test_add_refuses_bound_id() {
        let (_dir, _repo, _bus, service) =
            setup(FakeCatalog::new().with_details(full_details(603, "The Matrix", "1999-03-30")));
        service.add(ExternalId(603)).await.unwrap();

        let result = service.add(ExternalId(603)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_add_without_title_fails() {
        let (_dir, repo, _bus, service) =
            setup(FakeCatalog::new().with_details(DetailPayload::empty(ExternalId(7))));

        let result = service.add(ExternalId(7)).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::MissingCatalogTitle(7)))
        ));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_transport_failure_saves_nothing() {
        let (_dir, repo, _bus, service) = setup(
            FakeCatalog::new().with_details_error(ExternalId(9), TransportError::InvalidApiKey),
        );

        let result = service.add(ExternalId(9)).await;

        assert!(matches!(
            result,
            Err(AppError::Transport(TransportError::InvalidApiKey))
        ));
        assert!(repo.list_all().unwrap().is_empty());
    }
}
