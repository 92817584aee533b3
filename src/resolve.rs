//! Assignment of scraped names to the home or away side.
//!
//! Structural placement on the page always wins. When the markup gives no
//! placement, names are looked up in a curated roster table
//! (`data/curated_rosters.json`), then matched by substring against the
//! same table. Anything left over falls back to a default side and is
//! reported as unresolved.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::{Season, Side, SideConfidence};

const BUNDLED_ROSTERS: &str = include_str!("../data/curated_rosters.json");

/// Curated player lists, keyed by club and season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rosters {
    rosters: Vec<CuratedRoster>,
}

/// Known players of one club. An empty `seasons` list matches every season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedRoster {
    pub club: String,
    #[serde(default)]
    pub seasons: Vec<String>,
    pub players: Vec<String>,
}

impl CuratedRoster {
    fn applies_to(&self, club: &str, season: Season) -> bool {
        let season = season.to_string();
        same_club(&self.club, club) && (self.seasons.is_empty() || self.seasons.contains(&season))
    }

    fn contains_exact(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
            || name_tokens(name).any(|token| self.players.iter().any(|p| p == token))
    }

    fn contains_fuzzy(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.players
            .iter()
            .map(|p| p.to_lowercase())
            .any(|p| p.chars().count() >= 4 && (name.contains(&p) || p.contains(&name)))
    }
}

impl Rosters {
    /// The table shipped in `data/curated_rosters.json`.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_ROSTERS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn push(&mut self, roster: CuratedRoster) {
        self.rosters.push(roster);
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }

    fn for_club(&self, club: &str, season: Season) -> Vec<&CuratedRoster> {
        self.rosters
            .iter()
            .filter(|r| r.applies_to(club, season))
            .collect()
    }
}

/// Outcome of placing one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub side: Side,
    pub confidence: SideConfidence,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.confidence != SideConfidence::Assumed
    }
}

/// Side resolver for a single match.
#[derive(Debug)]
pub struct Resolver<'a> {
    home: Vec<&'a CuratedRoster>,
    away: Vec<&'a CuratedRoster>,
    default_side: Side,
}

impl<'a> Resolver<'a> {
    pub fn new(
        rosters: &'a Rosters,
        home_team: &str,
        away_team: &str,
        season: Season,
        default_side: Side,
    ) -> Self {
        Self {
            home: rosters.for_club(home_team, season),
            away: rosters.for_club(away_team, season),
            default_side,
        }
    }

    /// Whether a curated roster exists for either club of the match.
    pub fn has_rosters(&self) -> bool {
        !self.home.is_empty() || !self.away.is_empty()
    }

    pub fn default_side(&self) -> Side {
        self.default_side
    }

    /// Place `name`, preferring the side taken from the page structure.
    pub fn resolve(&self, name: &str, structural: Option<Side>) -> Resolution {
        if let Some(side) = structural {
            return Resolution {
                side,
                confidence: SideConfidence::Structural,
            };
        }
        if let Some(side) = self.roster_side(name) {
            return Resolution {
                side,
                confidence: SideConfidence::Roster,
            };
        }
        if let Some(side) = self.heuristic_side(name) {
            return Resolution {
                side,
                confidence: SideConfidence::Heuristic,
            };
        }
        debug!(name, side = %self.default_side, "name not in any roster, using default side");
        Resolution {
            side: self.default_side,
            confidence: SideConfidence::Assumed,
        }
    }

    /// Exact roster lookup. `None` when unknown or listed for both clubs.
    pub fn roster_side(&self, name: &str) -> Option<Side> {
        pick_side(
            self.home.iter().any(|r| r.contains_exact(name)),
            self.away.iter().any(|r| r.contains_exact(name)),
        )
    }

    fn heuristic_side(&self, name: &str) -> Option<Side> {
        pick_side(
            self.home.iter().any(|r| r.contains_fuzzy(name)),
            self.away.iter().any(|r| r.contains_fuzzy(name)),
        )
    }
}

fn pick_side(home: bool, away: bool) -> Option<Side> {
    match (home, away) {
        (true, false) => Some(Side::Home),
        (false, true) => Some(Side::Away),
        _ => None,
    }
}

fn name_tokens(name: &str) -> impl Iterator<Item = &str> {
    name.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| t.chars().count() >= 3)
}

fn same_club(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a == b || a.contains(&b) || b.contains(&a)
}
