// src/events/mod.rs
//
// Internal Event System - Public API
//
// EventHandler is internal to the bus and is not exported.

pub mod bus;
pub mod handlers;
pub mod resolution_events;
pub mod types;

pub use types::{DomainEvent, FilmEnriched, FilmLinkedManually, FilmRemoved, FilmUnlinked};

pub use bus::{EventBus, EventLogEntry};

pub use resolution_events::{EnrichmentBatchCompleted, FilmResolved};

pub use handlers::register_review_handlers;

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
