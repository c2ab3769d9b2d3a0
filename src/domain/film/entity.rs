// src/domain/film/entity.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a movie in the external catalog (TMDb movie id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub i64);

impl ExternalId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ExternalId {
    fn from(value: i64) -> Self {
        ExternalId(value)
    }
}

/// A film from the personal log, awaiting or holding a catalog binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Link back to the diary entry that created this film
    pub letterboxd_uri: String,

    pub title: String,

    /// Release year as logged (if known)
    pub year: Option<i32>,

    /// Catalog binding; unique across all films
    pub tmdb_id: Option<ExternalId>,

    /// Attributes copied from the catalog after a successful match
    pub enrichment: FilmEnrichment,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog-sourced attributes. Every field is nullable in storage, and a
/// film stays pending until the core ones are filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmEnrichment {
    pub directors: Option<Vec<String>>,
    pub actors: Option<Vec<String>>,
    /// Parallel to `actors`; an entry is None when the actor has no portrait
    pub actor_profile_paths: Option<Vec<Option<String>>>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Option<Vec<String>>,
    pub release_date: Option<NaiveDate>,
}

impl FilmEnrichment {
    /// All of the fields the enrichment run is responsible for are present
    pub fn is_complete(&self) -> bool {
        self.poster_path.is_some()
            && self.actors.is_some()
            && self.directors.is_some()
            && self.actor_profile_paths.is_some()
    }
}

/// Lightweight reference to another film, used when reporting conflicts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRef {
    pub id: Uuid,
    pub letterboxd_uri: String,
    pub title: String,
}

impl fmt::Display for FilmRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}, {})", self.title, self.id, self.letterboxd_uri)
    }
}

impl Film {
    /// Create a new, unbound Film
    pub fn new(letterboxd_uri: String, title: String, year: Option<i32>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            letterboxd_uri,
            title,
            year,
            tmdb_id: None,
            enrichment: FilmEnrichment::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Placeholder diary link for films added straight from the catalog
    pub fn placeholder_uri(tmdb_id: ExternalId) -> String {
        format!("tmdb_entry_placeholder_{}", tmdb_id)
    }

    pub fn film_ref(&self) -> FilmRef {
        FilmRef {
            id: self.id,
            letterboxd_uri: self.letterboxd_uri.clone(),
            title: self.title.clone(),
        }
    }

    /// Same local identity, regardless of field contents
    pub fn is_same_record(&self, other: &Film) -> bool {
        self.id == other.id
    }

    /// Still missing a binding or one of the core enrichment fields
    pub fn needs_enrichment(&self) -> bool {
        self.tmdb_id.is_none() || !self.enrichment.is_complete()
    }

    /// Bind to a catalog entry and replace enrichment
    pub fn bind(&mut self, tmdb_id: ExternalId, enrichment: FilmEnrichment) {
        self.tmdb_id = Some(tmdb_id);
        self.enrichment = enrichment;
        self.updated_at = Utc::now();
    }

    /// Drop the catalog binding and everything copied from it
    pub fn clear_binding(&mut self) {
        self.tmdb_id = None;
        self.enrichment = FilmEnrichment::default();
        self.updated_at = Utc::now();
    }
}
