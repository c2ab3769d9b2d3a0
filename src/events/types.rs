// src/events/types.rs
//
// Film lifecycle events.
// Each event represents an immutable fact that has already occurred.
//
// RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// ENRICHMENT EVENTS
// ============================================================================

/// A film was bound to a catalog entry and its attributes written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmEnriched {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub film_id: Uuid,
    pub tmdb_id: i64,
    pub title: String,
}

impl FilmEnriched {
    pub fn new(film_id: Uuid, tmdb_id: i64, title: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            film_id,
            tmdb_id,
            title,
        }
    }
}

impl DomainEvent for FilmEnriched {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FilmEnriched" }
}

/// An unmatched film was deleted by the enrichment run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmRemoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub film_id: Uuid,
    pub letterboxd_uri: String,
    pub title: String,
}

impl FilmRemoved {
    pub fn new(film_id: Uuid, letterboxd_uri: String, title: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            film_id,
            letterboxd_uri,
            title,
        }
    }
}

impl DomainEvent for FilmRemoved {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FilmRemoved" }
}

// ============================================================================
// CURATION EVENTS
// ============================================================================

/// An operator bound a film to a catalog id by hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmLinkedManually {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub film_id: Uuid,
    pub tmdb_id: i64,
    /// True when the film was created by the link (catalog add)
    pub created: bool,
}

impl FilmLinkedManually {
    pub fn new(film_id: Uuid, tmdb_id: i64, created: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            film_id,
            tmdb_id,
            created,
        }
    }
}

impl DomainEvent for FilmLinkedManually {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FilmLinkedManually" }
}

/// An operator removed a film's catalog binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmUnlinked {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub film_id: Uuid,
    pub previous_tmdb_id: Option<i64>,
}

impl FilmUnlinked {
    pub fn new(film_id: Uuid, previous_tmdb_id: Option<i64>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            film_id,
            previous_tmdb_id,
        }
    }
}

impl DomainEvent for FilmUnlinked {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FilmUnlinked" }
}
