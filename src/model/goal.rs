use serde::Serialize;

use super::common::Side;

/// How the side of a goal was determined, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SideConfidence {
    /// Left/right placement in the goals section.
    Structural,
    /// Found in the curated roster of one of the clubs.
    Roster,
    /// Substring match against a curated roster.
    Heuristic,
    /// Nothing matched; the caller's default side was used.
    Assumed,
}

/// A single goal.
///
/// `minute` encodes stoppage time as base plus offset, so `90'+11` is 101.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalEvent {
    pub minute: u16,
    pub scorer: String,
    pub side: Side,
    pub side_confidence: SideConfidence,
    pub assist: Option<String>,
    pub goal_type: Option<String>,
    pub score_after: Option<(u8, u8)>,
}

impl GoalEvent {
    pub fn new(minute: u16, scorer: impl Into<String>, side: Side) -> Self {
        Self {
            minute,
            scorer: scorer.into(),
            side,
            side_confidence: SideConfidence::Assumed,
            assist: None,
            goal_type: None,
            score_after: None,
        }
    }

    /// Whether the goal was scored in stoppage time of the second half.
    pub fn is_stoppage_time(&self) -> bool {
        self.minute > 90
    }

    /// Identity used to de-duplicate goals found by different passes.
    ///
    /// Names are compared by surname, so `F. Wirtz` and `Florian Wirtz`
    /// match `Wirtz` in the same minute.
    pub fn same_goal(&self, minute: u16, scorer: &str) -> bool {
        self.minute == minute
            && (self.scorer == scorer || same_surname(&self.scorer, scorer))
    }
}

fn same_surname(a: &str, b: &str) -> bool {
    match (a.split_whitespace().last(), b.split_whitespace().last()) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_goal_matches_abbreviated_first_name() {
        let goal = GoalEvent::new(101, "Wirtz", Side::Away);
        assert!(goal.same_goal(101, "F. Wirtz"));
        assert!(goal.same_goal(101, "Florian Wirtz"));
        assert!(goal.same_goal(101, "Wirtz"));
        assert!(!goal.same_goal(100, "F. Wirtz"));
        assert!(!goal.same_goal(101, "Boniface"));
        assert!(!goal.same_goal(101, ""));
    }
}
