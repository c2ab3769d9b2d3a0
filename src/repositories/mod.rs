// src/repositories/mod.rs
//
// Persistence layer. Traits are synchronous; SQLite implementations share a
// pooled connection.

pub mod film_repository;

pub use film_repository::{BindOutcome, FilmRepository, SqliteFilmRepository};

#[cfg(test)]
pub use film_repository::MockFilmRepository;
