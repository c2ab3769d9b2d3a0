// src/events/handlers/review_handler.rs
//
// Operator-facing handlers. Collisions and removals are the outcomes an
// operator has to look at, so they are logged at warn level with enough
// context to act on by hand.

use crate::events::resolution_events::{EnrichmentBatchCompleted, FilmResolved};
use crate::events::types::{FilmLinkedManually, FilmRemoved, FilmUnlinked};
use crate::events::EventBus;

pub fn register_review_handlers(bus: &EventBus) {
    bus.subscribe::<FilmResolved, _>(handle_film_resolved);

    bus.subscribe::<FilmRemoved, _>(|event| {
        log::warn!(
            "[REVIEW] Removed unmatched film '{}' ({})",
            event.title,
            event.letterboxd_uri
        );
    });

    bus.subscribe::<FilmLinkedManually, _>(|event| {
        log::info!(
            "[REVIEW] Film {} linked by hand to TMDb {}{}",
            event.film_id,
            event.tmdb_id,
            if event.created { " (new entry)" } else { "" }
        );
    });

    bus.subscribe::<FilmUnlinked, _>(|event| {
        log::info!(
            "[REVIEW] Film {} unlinked (was TMDb {:?})",
            event.film_id,
            event.previous_tmdb_id
        );
    });

    bus.subscribe::<EnrichmentBatchCompleted, _>(|event| {
        if event.collisions > 0 || event.failed > 0 {
            log::warn!(
                "[REVIEW] Enrichment finished with {} collision(s) and {} failure(s) to review",
                event.collisions,
                event.failed
            );
        }
    });

    log::debug!("[REVIEW] Handlers registered");
}

fn handle_film_resolved(event: &FilmResolved) {
    if !event.is_collision() {
        return;
    }

    log::warn!(
        "[REVIEW] Collision: '{}' ({}) matched TMDb {:?}, already held by '{}' ({})",
        event.title,
        event.film_id,
        event.tmdb_id,
        event.conflicting_title.as_deref().unwrap_or("?"),
        event
            .conflicting_film_id
            .map(|id| id.to_string())
            .unwrap_or_default()
    );
}
