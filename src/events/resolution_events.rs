// src/events/resolution_events.rs
//
// Resolution Events
//
// Outputs of the resolution orchestrator and the batch runner.
//
// INVARIANTS:
// - FilmResolved is deterministic: no timestamp in the payload, id derived
//   from a content fingerprint, so resolving the same film against the same
//   catalog state yields an identical event
// - occurred_at() returns SENTINEL_TIMESTAMP for trait compliance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{Film, ResolutionOutcome, SearchPass};
use crate::events::DomainEvent;

/// Sentinel timestamp for deterministic events (Unix epoch).
const SENTINEL_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

// ============================================================================
// FILM RESOLVED EVENT
// ============================================================================

/// Emitted once per resolve() call that reached a terminal outcome.
/// Transport failures do not produce this event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmResolved {
    pub film_id: Uuid,
    pub title: String,
    pub year: Option<i32>,

    /// "matched", "no_match" or "collision"
    pub outcome: String,

    /// Selected catalog id (matched or collided)
    pub tmdb_id: Option<i64>,

    /// Pass that produced the match
    pub pass: Option<SearchPass>,

    /// Film already holding the id, on collision
    pub conflicting_film_id: Option<Uuid>,
    pub conflicting_title: Option<String>,

    pub fingerprint: String,
}

impl FilmResolved {
    pub fn from_outcome(film: &Film, outcome: &ResolutionOutcome) -> Self {
        let (tmdb_id, pass, conflicting) = match outcome {
            ResolutionOutcome::Matched {
                external_id, pass, ..
            } => (Some(external_id.value()), Some(*pass), None),
            ResolutionOutcome::NoMatch => (None, None, None),
            ResolutionOutcome::Collision {
                external_id,
                conflicting,
            } => (Some(external_id.value()), None, Some(conflicting)),
        };

        let conflicting_film_id = conflicting.map(|c| c.id);
        let fingerprint =
            Self::compute_fingerprint(film.id, outcome.kind(), tmdb_id, pass, conflicting_film_id);

        Self {
            film_id: film.id,
            title: film.title.clone(),
            year: film.year,
            outcome: outcome.kind().to_string(),
            tmdb_id,
            pass,
            conflicting_film_id,
            conflicting_title: conflicting.map(|c| c.title.clone()),
            fingerprint,
        }
    }

    pub fn is_collision(&self) -> bool {
        self.outcome == "collision"
    }

    /// SHA-256 over film id, outcome kind, catalog id, pass and conflicting film
    fn compute_fingerprint(
        film_id: Uuid,
        outcome: &str,
        tmdb_id: Option<i64>,
        pass: Option<SearchPass>,
        conflicting_film_id: Option<Uuid>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(film_id.as_bytes());
        hasher.update(outcome.as_bytes());
        if let Some(id) = tmdb_id {
            hasher.update(id.to_be_bytes());
        }
        if let Some(p) = pass {
            hasher.update(p.to_string().as_bytes());
        }
        if let Some(other) = conflicting_film_id {
            hasher.update(other.as_bytes());
        }

        let digest = hasher.finalize();
        format!("res:{}", hex_prefix(&digest, 16))
    }
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes.iter().take(len).map(|b| format!("{:02x}", b)).collect()
}

impl DomainEvent for FilmResolved {
    fn event_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.fingerprint.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "FilmResolved"
    }
}

// ============================================================================
// ENRICHMENT BATCH COMPLETED EVENT
// ============================================================================

/// Emitted when an enrichment run finishes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentBatchCompleted {
    pub total: usize,
    pub updated: usize,
    pub deleted: usize,
    pub kept_unmatched: usize,
    pub collisions: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub batch_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

impl EnrichmentBatchCompleted {
    pub fn new(
        total: usize,
        updated: usize,
        deleted: usize,
        kept_unmatched: usize,
        collisions: usize,
        failed: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            total,
            updated,
            deleted,
            kept_unmatched,
            collisions,
            failed,
            duration_ms,
            batch_id: Uuid::new_v4(),
            completed_at: Utc::now(),
        }
    }
}

impl DomainEvent for EnrichmentBatchCompleted {
    fn event_id(&self) -> Uuid {
        self.batch_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    fn event_type(&self) -> &'static str {
        "EnrichmentBatchCompleted"
    }
}
