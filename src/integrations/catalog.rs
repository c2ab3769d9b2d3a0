// src/integrations/catalog.rs
//
// External catalog seams
//
// The resolution core talks to the catalog only through these traits, so the
// HTTP client can be swapped for an in-memory fake in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CandidateResult, ExternalId};
use crate::error::TransportError;

/// Title search against the catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// One search call. An empty Vec is a legitimate "nothing found";
    /// a failed call is always an Err.
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, TransportError>;
}

/// Full record fetch, used only after a match has been accepted
#[async_trait]
pub trait CatalogDetails: Send + Sync {
    async fn fetch_details(&self, external_id: ExternalId) -> Result<DetailPayload, TransportError>;
}

/// Movie details with credits, as returned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPayload {
    pub external_id: ExternalId,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    /// Billing order
    pub cast: Vec<CastMember>,
}

impl DetailPayload {
    /// Payload with only the id set
    pub fn empty(external_id: ExternalId) -> Self {
        Self {
            external_id,
            title: None,
            release_date: None,
            poster_path: None,
            backdrop_path: None,
            runtime: None,
            genres: Vec::new(),
            directors: Vec::new(),
            cast: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub profile_path: Option<String>,
}
