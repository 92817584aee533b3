use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::common::{Side, Sourced};
use super::goal::GoalEvent;
use super::matchlist::Season;
use super::team::Team;
use crate::error::ExtractionIssue;

static DISPLAY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").expect("date pattern"));

/// Full result of a single match.
///
/// The score and the goal lists are allowed to disagree: when goal
/// extraction fell back to a low-confidence tier, `score_source` says where
/// the score came from and `issues` records what went wrong.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub address: String,
    pub home_team: Team,
    pub away_team: Team,
    pub date: Sourced<String>,
    pub season: Season,
    pub matchday: Option<u8>,
    pub score: Sourced<Score>,
    pub score_source: ScoreSource,
    pub home_goals: Vec<GoalEvent>,
    pub away_goals: Vec<GoalEvent>,
    pub issues: Vec<ExtractionIssue>,
}

/// Final score of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}

impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

/// Where the final score of a [`Match`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScoreSource {
    /// Counted from structurally extracted goals.
    GoalTally,
    /// Page title or heading.
    Title,
    /// A score element in the page body.
    ScoreElement,
    /// Nothing found.
    Placeholder,
}

impl Match {
    pub fn home_score(&self) -> u8 {
        self.score.value.home
    }

    pub fn away_score(&self) -> u8 {
        self.score.value.away
    }

    pub fn total_goals(&self) -> u16 {
        u16::from(self.home_score()) + u16::from(self.away_score())
    }

    /// Side of the winning team, `None` for a draw.
    pub fn winner(&self) -> Option<Side> {
        match self.home_score().cmp(&self.away_score()) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn goals(&self, side: Side) -> &[GoalEvent] {
        match side {
            Side::Home => &self.home_goals,
            Side::Away => &self.away_goals,
        }
    }

    pub fn involves_team(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.home_team.name.to_lowercase() == name || self.away_team.name.to_lowercase() == name
    }

    /// Whether the goal lists account for the full score.
    pub fn goals_match_score(&self) -> bool {
        self.home_goals.len() == usize::from(self.home_score())
            && self.away_goals.len() == usize::from(self.away_score())
    }

    /// Whether anything beyond placeholders was read from the page.
    pub fn has_data(&self) -> bool {
        !self.score.is_defaulted()
            || !self.home_goals.is_empty()
            || !self.away_goals.is_empty()
            || !self.home_team.players.is_empty()
            || !self.away_team.players.is_empty()
    }

    /// Calendar date parsed from the display date, when it carries a year.
    pub fn kickoff_date(&self) -> Option<NaiveDate> {
        let caps = DISPLAY_DATE_RE.captures(&self.date.value)?;
        NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: &str, home: u8, away: u8) -> Match {
        Match {
            address: String::new(),
            home_team: Team::new("Bor. Mönchengladbach"),
            away_team: Team::new("Bayer 04 Leverkusen"),
            date: Sourced::extracted(date.to_string()),
            season: Season::new(2024),
            matchday: Some(2),
            score: Sourced::extracted(Score::new(home, away)),
            score_source: ScoreSource::Title,
            home_goals: vec![],
            away_goals: vec![],
            issues: vec![],
        }
    }

    #[test]
    fn test_winner_and_totals() {
        let m = sample("Fr., 30.08.2024, 20:30", 2, 3);
        assert_eq!(m.winner(), Some(Side::Away));
        assert_eq!(m.total_goals(), 5);
        assert!(m.involves_team("bayer 04 leverkusen"));
        assert!(!m.goals_match_score());
        assert_eq!(sample("", 1, 1).winner(), None);
    }

    #[test]
    fn test_kickoff_date() {
        let m = sample("Fr., 30.08.2024, 20:30", 2, 3);
        assert_eq!(m.kickoff_date(), NaiveDate::from_ymd_opt(2024, 8, 30));
        assert_eq!(sample("30.08.", 0, 0).kickoff_date(), None);
    }
}
