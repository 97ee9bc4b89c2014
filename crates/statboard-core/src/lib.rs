use serde::{Deserialize, Serialize};
use std::fmt;

pub mod cards;
pub mod error;

pub use cards::{
    INDICATOR_COLORS, Indicator, IndicatorsCard, IndicatorsCardGroup, RawIndicator, TeamCard,
    TeamGrid, TeamStats, fill_percent, team_cards,
};
pub use error::OverlayError;

/// Identifier of the entity an overlay describes (a team, in the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distinguishes one fetch session from every later one on the same controller.
///
/// Tokens only ever grow; zero is never handed out, so a default token never
/// matches a live session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_grow() {
        let first = SessionToken::default().next();
        let second = first.next();
        assert!(second > first);
        assert_ne!(first, SessionToken::default());
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_subject_id_is_transparent_in_json() {
        let json = serde_json::to_string(&SubjectId(42)).unwrap();
        assert_eq!(json, "42");
        let back: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SubjectId(42));
    }
}
