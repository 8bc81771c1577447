//! Events a caller reacts to after a placement attempt.
//!
//! The engine never plays sounds or animations itself. Hosts map these to
//! their own effects (the browser client plays "drop", "wrong", "solved" and
//! "lose" clips).

use serde::{Deserialize, Serialize};

/// Something worth reacting to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// A piece was placed
    Drop,
    /// A placement was attempted where the piece does not fit
    Wrong,
    /// The placement completed at least one line
    Solved,
    /// No remaining piece fits anywhere
    Lose,
}

impl GameEvent {
    /// Short lowercase name, matching the client's effect names
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Drop => "drop",
            GameEvent::Wrong => "wrong",
            GameEvent::Solved => "solved",
            GameEvent::Lose => "lose",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(GameEvent::Drop.name(), "drop");
        assert_eq!(GameEvent::Lose.name(), "lose");
    }

    #[test]
    fn test_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&GameEvent::Solved).unwrap(), "\"Solved\"");
    }
}
