// src/domain/film/invariants.rs
//
// Checks a Film must pass before it is written to the store.

use super::entity::Film;
use crate::domain::{DomainError, DomainResult};

/// Validates all Film invariants
pub fn validate_film(film: &Film) -> DomainResult<()> {
    validate_title(&film.title)?;
    validate_uri(&film.letterboxd_uri)?;
    validate_year(film.year)?;
    validate_cast_alignment(film)?;
    Ok(())
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Film title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_uri(uri: &str) -> DomainResult<()> {
    if uri.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Film must carry a diary URI".to_string(),
        ));
    }
    Ok(())
}

fn validate_year(year: Option<i32>) -> DomainResult<()> {
    if let Some(y) = year {
        if !(1870..=2200).contains(&y) {
            return Err(DomainError::InvariantViolation(format!(
                "Film year {} is out of range",
                y
            )));
        }
    }
    Ok(())
}

/// Profile paths are stored positionally against actors
fn validate_cast_alignment(film: &Film) -> DomainResult<()> {
    if let (Some(actors), Some(paths)) = (
        &film.enrichment.actors,
        &film.enrichment.actor_profile_paths,
    ) {
        if actors.len() != paths.len() {
            return Err(DomainError::InvariantViolation(format!(
                "{} actors but {} profile paths",
                actors.len(),
                paths.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::film::FilmEnrichment;

    fn film() -> Film {
        Film::new("https://boxd.it/2bg8".into(), "Alien".into(), Some(1979))
    }

    #[test]
    fn test_valid_film() {
        assert!(validate_film(&film()).is_ok());
    }

    #[test]
    fn test_empty_title_fails() {
        let mut f = film();
        f.title = "  ".into();
        assert!(validate_film(&f).is_err());
    }

    #[test]
    fn test_empty_uri_fails() {
        let mut f = film();
        f.letterboxd_uri = String::new();
        assert!(validate_film(&f).is_err());
    }

    #[test]
    fn test_unknown_year_is_valid() {
        let mut f = film();
        f.year = None;
        assert!(validate_film(&f).is_ok());
    }

    #[test]
    fn test_absurd_year_fails() {
        let mut f = film();
        f.year = Some(79);
        assert!(validate_film(&f).is_err());
    }

    #[test]
    fn test_misaligned_profile_paths_fail() {
        let mut f = film();
        f.enrichment = FilmEnrichment {
            actors: Some(vec!["Sigourney Weaver".into(), "Tom Skerritt".into()]),
            actor_profile_paths: Some(vec![Some("/sw.jpg".into())]),
            ..FilmEnrichment::default()
        };
        assert!(validate_film(&f).is_err());
    }
}
