// src/services/test_support.rs
//
// In-memory catalog and store fixtures shared by the service tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::{create_pool_at, initialize_database};
use crate::domain::{CandidateResult, ExternalId};
use crate::error::TransportError;
use crate::integrations::{CatalogDetails, CatalogSearch, DetailPayload};
use crate::repositories::SqliteFilmRepository;

type SearchKey = (String, Option<i32>);

/// Scripted catalog. Unscripted searches return no results; unscripted
/// detail fetches fail with NotFound.
#[derive(Default)]
pub struct FakeCatalog {
    searches: Mutex<HashMap<SearchKey, Result<Vec<CandidateResult>, TransportError>>>,
    details: Mutex<HashMap<ExternalId, Result<DetailPayload, TransportError>>>,
    search_calls: Mutex<Vec<SearchKey>>,
    detail_calls: Mutex<Vec<ExternalId>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, query: &str, year: Option<i32>, results: Vec<CandidateResult>) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert((query.to_string(), year), Ok(results));
        self
    }

    pub fn with_search_error(self, query: &str, year: Option<i32>, error: TransportError) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert((query.to_string(), year), Err(error));
        self
    }

    pub fn with_details(self, payload: DetailPayload) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(payload.external_id, Ok(payload));
        self
    }

    pub fn with_details_error(self, id: ExternalId, error: TransportError) -> Self {
        self.details.lock().unwrap().insert(id, Err(error));
        self
    }

    pub fn search_calls(&self) -> Vec<SearchKey> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<ExternalId> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, TransportError> {
        let key = (query.to_string(), year);
        self.search_calls.lock().unwrap().push(key.clone());
        self.searches
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl CatalogDetails for FakeCatalog {
    async fn fetch_details(&self, external_id: ExternalId) -> Result<DetailPayload, TransportError> {
        self.detail_calls.lock().unwrap().push(external_id);
        self.details
            .lock()
            .unwrap()
            .get(&external_id)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::NotFound(format!("/movie/{}", external_id))))
    }
}

/// Search hit with a small JSON payload
pub fn hit(id: i64, title: &str, release_date: &str, popularity: f64) -> CandidateResult {
    CandidateResult::new(
        ExternalId(id),
        Some(title.to_string()),
        Some(release_date.to_string()),
        popularity,
    )
    .with_payload(serde_json::json!({
        "id": id,
        "title": title,
        "release_date": release_date,
        "popularity": popularity,
    }))
}

/// Detail payload with every core enrichment field populated
pub fn full_details(id: i64, title: &str, release_date: &str) -> DetailPayload {
    DetailPayload {
        title: Some(title.to_string()),
        release_date: Some(release_date.to_string()),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        runtime: Some(100),
        genres: vec!["Drama".to_string()],
        directors: vec!["Some Director".to_string()],
        cast: vec![crate::integrations::CastMember {
            name: "Lead Actor".to_string(),
            profile_path: Some("/lead.jpg".to_string()),
        }],
        ..DetailPayload::empty(ExternalId(id))
    }
}

/// SQLite-backed repository in a temporary directory
pub fn temp_repo() -> (TempDir, Arc<SqliteFilmRepository>) {
    let dir = TempDir::new().unwrap();
    let pool = create_pool_at(&dir.path().join("films.db")).unwrap();
    initialize_database(&pool.get().unwrap()).unwrap();
    (dir, Arc::new(SqliteFilmRepository::new(Arc::new(pool))))
}
