use serde::Serialize;
use strum_macros::EnumString;

/// A team as it appears in a single match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: vec![],
        }
    }

    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|p| p.name.as_str())
    }
}

/// A player in a starting lineup.
///
/// `details` is only filled when the lineup came from the structural tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub details: Option<PlayerDetails>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: None,
        }
    }
}

/// Extended lineup information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetails {
    pub position: Position,
    pub rating: Option<f32>,
    pub is_captain: bool,
}

/// Position group, derived from the order of the lineup list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, strum_macros::Display)]
pub enum Position {
    #[strum(serialize = "TW")]
    Goalkeeper,
    #[strum(serialize = "AB")]
    Defender,
    #[strum(serialize = "MF")]
    Midfielder,
    #[strum(serialize = "ST")]
    Forward,
}

impl Position {
    /// Position of the `index`-th player of a lineup, assuming a back four.
    pub fn from_lineup_index(index: usize) -> Self {
        match index {
            0 => Position::Goalkeeper,
            1..=4 => Position::Defender,
            5..=8 => Position::Midfielder,
            _ => Position::Forward,
        }
    }
}
