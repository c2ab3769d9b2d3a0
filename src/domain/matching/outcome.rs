// src/domain/matching/outcome.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::film::{ExternalId, FilmRef};

/// Which search pass produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPass {
    /// Search biased by the local year
    TitleAndYear,
    /// Title-only fallback
    TitleOnly,
}

impl fmt::Display for SearchPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPass::TitleAndYear => write!(f, "title+year"),
            SearchPass::TitleOnly => write!(f, "title-only"),
        }
    }
}

/// Terminal result of resolving one film.
///
/// Transport failures are not represented here; they surface as
/// `Err(AppError::Transport)` from the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Matched {
        external_id: ExternalId,
        /// The catalog search hit that was selected
        payload: serde_json::Value,
        pass: SearchPass,
        similarity: f64,
    },
    NoMatch,
    Collision {
        external_id: ExternalId,
        conflicting: FilmRef,
    },
}

impl ResolutionOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, ResolutionOutcome::Matched { .. })
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, ResolutionOutcome::Collision { .. })
    }

    pub fn matched_id(&self) -> Option<ExternalId> {
        match self {
            ResolutionOutcome::Matched { external_id, .. } => Some(*external_id),
            _ => None,
        }
    }

    /// Short label used in logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionOutcome::Matched { .. } => "matched",
            ResolutionOutcome::NoMatch => "no_match",
            ResolutionOutcome::Collision { .. } => "collision",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_outcome_accessors() {
        let matched = ResolutionOutcome::Matched {
            external_id: ExternalId(603),
            payload: serde_json::json!({"id": 603}),
            pass: SearchPass::TitleAndYear,
            similarity: 1.0,
        };
        assert!(matched.is_matched());
        assert_eq!(matched.matched_id(), Some(ExternalId(603)));
        assert_eq!(matched.kind(), "matched");

        let collision = ResolutionOutcome::Collision {
            external_id: ExternalId(603),
            conflicting: FilmRef {
                id: Uuid::nil(),
                letterboxd_uri: "u".into(),
                title: "t".into(),
            },
        };
        assert!(collision.is_collision());
        assert_eq!(collision.matched_id(), None);
        assert_eq!(ResolutionOutcome::NoMatch.kind(), "no_match");
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(ResolutionOutcome::NoMatch).unwrap();
        assert_eq!(json["outcome"], "no_match");
    }

    #[test]
    fn test_pass_display() {
        assert_eq!(SearchPass::TitleAndYear.to_string(), "title+year");
        assert_eq!(SearchPass::TitleOnly.to_string(), "title-only");
    }
}
