// src/integrations/tmdb/client.rs
//
// TMDb API Integration
//
// ARCHITECTURE:
// - REST client for TMDb v3 (search/movie, movie/{id}?append_to_response=credits)
// - Paces calls with a shared rate limiter
// - Maps wire data into CandidateResult / DetailPayload (NO domain mutation)
// - No retries: a failed call is reported once, as a TransportError

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::TmdbConfig;
use crate::domain::{CandidateResult, ExternalId};
use crate::error::{AppError, AppResult, TransportError};
use crate::integrations::catalog::{CastMember, CatalogDetails, CatalogSearch, DetailPayload};

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// The fields of a search hit the matcher looks at
#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    title: Option<String>,
    release_date: Option<String>,
    popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    id: i64,
    title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    runtime: Option<i64>,
    #[serde(default)]
    genres: Vec<GenreData>,
    #[serde(default)]
    credits: CreditsData,
}

#[derive(Debug, Deserialize)]
struct GenreData {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CreditsData {
    #[serde(default)]
    cast: Vec<CastData>,
    #[serde(default)]
    crew: Vec<CrewData>,
}

#[derive(Debug, Deserialize)]
struct CastData {
    name: Option<String>,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrewData {
    name: Option<String>,
    job: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}

// ============================================================================
// RATE LIMITER
// ============================================================================

/// Enforces a minimum interval between consecutive calls
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// TMDb API Client
pub struct TmdbClient {
    base_url: String,
    api_key: String,
    http_client: Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl TmdbClient {
    /// Fails with `AppError::Config` when no API key is configured
    pub fn new(config: &TmdbConfig) -> AppResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            http_client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(Duration::from_millis(
                config.call_delay_ms,
            )))),
        })
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    /// GET a JSON document from the API
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let url = format!("{}{}", self.base_url, path);
        log::debug!("TMDb GET {}", path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_to_error(status, path, &body));
        }

        let bytes = response.bytes().await.map_err(TransportError::from)?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogSearch for TmdbClient {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, TransportError> {
        let mut params = vec![("query", query.to_string())];
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }

        let response: SearchResponse = self.get_json("/search/movie", &params).await?;
        Ok(map_search_results(response.results))
    }
}

#[async_trait]
impl CatalogDetails for TmdbClient {
    async fn fetch_details(&self, external_id: ExternalId) -> Result<DetailPayload, TransportError> {
        let details: MovieDetails = self
            .get_json(
                &format!("/movie/{}", external_id),
                &[("append_to_response", "credits".to_string())],
            )
            .await?;
        Ok(map_details(details))
    }
}

// ============================================================================
// MAPPING
// ============================================================================

fn status_to_error(status: StatusCode, path: &str, body: &str) -> TransportError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());

    match status {
        StatusCode::UNAUTHORIZED => TransportError::InvalidApiKey,
        StatusCode::NOT_FOUND => TransportError::NotFound(path.to_string()),
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited,
        other => TransportError::Http {
            status: other.as_u16(),
            message,
        },
    }
}

/// Hits without a numeric id cannot be bound and are skipped.
fn map_search_results(results: Vec<serde_json::Value>) -> Vec<CandidateResult> {
    results
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<SearchHit>(raw.clone()) {
            Ok(hit) => Some(
                CandidateResult::new(
                    ExternalId(hit.id),
                    hit.title.filter(|t| !t.trim().is_empty()),
                    hit.release_date,
                    hit.popularity.unwrap_or(0.0),
                )
                .with_payload(raw),
            ),
            Err(e) => {
                log::warn!("Skipping malformed TMDb search hit: {}", e);
                None
            }
        })
        .collect()
}

fn map_details(details: MovieDetails) -> DetailPayload {
    let directors = details
        .credits
        .crew
        .into_iter()
        .filter(|c| c.job.as_deref() == Some("Director"))
        .filter_map(|c| c.name)
        .collect();

    let cast = details
        .credits
        .cast
        .into_iter()
        .filter_map(|c| {
            c.name.map(|name| CastMember {
                name,
                profile_path: c.profile_path,
            })
        })
        .collect();

    DetailPayload {
        external_id: ExternalId(details.id),
        title: details.title.filter(|t| !t.trim().is_empty()),
        release_date: details.release_date.filter(|d| !d.is_empty()),
        poster_path: details.poster_path,
        backdrop_path: details.backdrop_path,
        runtime: details
            .runtime
            .filter(|r| *r > 0)
            .and_then(|r| u32::try_from(r).ok()),
        genres: details
            .genres
            .into_iter()
            .filter_map(|g| g.name.filter(|n| !n.trim().is_empty()))
            .collect(),
        directors,
        cast,
    }
}
