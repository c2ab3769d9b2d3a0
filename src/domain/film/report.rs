// src/domain/film/report.rs
//
// Aggregate views over enriched films: release-year histogram, genre counts,
// most frequent directors and actors, total runtime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// A name (genre, director, actor) and the number of films it appears on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

impl NamedCount {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmReport {
    /// Ascending by year
    pub by_year: Vec<YearCount>,
    /// Most common first
    pub by_genre: Vec<NamedCount>,
    pub top_directors: Vec<NamedCount>,
    pub top_actors: Vec<NamedCount>,
    pub total_runtime_minutes: u64,
}

impl FilmReport {
    pub fn total_hours(&self) -> f64 {
        self.total_runtime_minutes as f64 / 60.0
    }
}
