// src/domain/matching/collision.rs
//
// Identity Collision Guard
//
// A catalog id may be held by at most one film. Before a match is declared,
// the film currently bound to the candidate id (if any) must be the film
// being resolved.

use crate::domain::film::{ExternalId, Film, FilmRef};

/// Returns the conflicting film when `candidate` is already bound to a
/// different local record. Lookup failures propagate unchanged.
pub fn check_collision<F, E>(
    candidate: ExternalId,
    current: &Film,
    lookup: F,
) -> Result<Option<FilmRef>, E>
where
    F: FnOnce(ExternalId) -> Result<Option<Film>, E>,
{
    match lookup(candidate)? {
        Some(bound) if !bound.is_same_record(current) => Ok(Some(bound.film_ref())),
        _ => Ok(None),
    }
}
