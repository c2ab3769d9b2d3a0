pub mod entity;
pub mod invariants;
pub mod report;

pub use entity::{ExternalId, Film, FilmEnrichment, FilmRef};
pub use invariants::validate_film;
pub use report::{FilmReport, NamedCount, YearCount};
