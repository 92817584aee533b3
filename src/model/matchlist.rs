use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::KickerError;

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("season pattern"));

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([\w-]+)-gegen-([\w-]+)-(\d{4})-").expect("address pattern")
});

/// A Bundesliga season such as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season {
    start_year: u16,
}

/// Number of rounds and clubs of a league season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeagueFormat {
    pub matchdays: u8,
    pub clubs: u8,
}

impl Season {
    pub fn new(start_year: u16) -> Self {
        Self { start_year }
    }

    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    /// League format in force for this season.
    pub fn format(&self) -> LeagueFormat {
        let (matchdays, clubs) = match self.start_year {
            1995.. => (34, 18),
            1991..=1994 => (38, 20),
            1974..=1990 => (34, 18),
            _ => (30, 16),
        };
        LeagueFormat { matchdays, clubs }
    }

    pub fn expected_matchdays(&self) -> u8 {
        self.format().matchdays
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

impl FromStr for Season {
    type Err = KickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KickerError::InvalidSeason {
            season: s.to_string(),
        };
        let caps = SEASON_RE.captures(s.trim()).ok_or_else(invalid)?;
        let start_year: u16 = caps[1].parse()?;
        let end_year: u16 = caps[2].parse()?;
        if (start_year + 1) % 100 != end_year {
            return Err(invalid());
        }
        Ok(Self { start_year })
    }
}

impl Serialize for Season {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A match detail-page address split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchAddress {
    pub url: String,
    pub home_slug: String,
    pub away_slug: String,
    pub year: u16,
}

impl MatchAddress {
    pub fn parse(url: &str) -> Result<Self, KickerError> {
        let caps = ADDRESS_RE
            .captures(url)
            .ok_or_else(|| KickerError::AddressFormat {
                address: url.to_string(),
            })?;
        Ok(Self {
            url: url.to_string(),
            home_slug: caps[1].to_string(),
            away_slug: caps[2].to_string(),
            year: caps[3].parse()?,
        })
    }

    /// The season whose first calendar year appears in the address.
    pub fn season(&self) -> Season {
        Season::new(self.year)
    }
}

/// A fixture found on a season's match-day overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredMatch {
    pub address: String,
    pub expected_matchday: u8,
}

/// All fixtures of a season, in page order.
pub type SeasonMatchList = Vec<DiscoveredMatch>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_season() {
        let season: Season = "2024-25".parse().unwrap();
        assert_eq!(season.start_year(), 2024);
        assert_eq!(season.to_string(), "2024-25");

        let season: Season = "1999-00".parse().unwrap();
        assert_eq!(season.to_string(), "1999-00");

        assert!("2024-26".parse::<Season>().is_err());
        assert!("2024/25".parse::<Season>().is_err());
    }

    #[test]
    fn test_league_format_by_era() {
        assert_eq!(Season::new(1996).expected_matchdays(), 34);
        assert_eq!(Season::new(1992).format().clubs, 20);
        assert_eq!(Season::new(1992).expected_matchdays(), 38);
        assert_eq!(Season::new(1980).expected_matchdays(), 34);
        assert_eq!(Season::new(1970).format().clubs, 16);
        assert_eq!(Season::new(1970).expected_matchdays(), 30);
    }

    #[test]
    fn test_parse_address() {
        let address = MatchAddress::parse(
            "https://www.kicker.de/moenchengladbach-gegen-leverkusen-2024-bundesliga-4863077/schema",
        )
        .unwrap();
        assert_eq!(address.home_slug, "moenchengladbach");
        assert_eq!(address.away_slug, "leverkusen");
        assert_eq!(address.year, 2024);
        assert_eq!(address.season().to_string(), "2024-25");

        let err = MatchAddress::parse("https://www.kicker.de/bundesliga/tabelle").unwrap_err();
        assert!(matches!(err, KickerError::AddressFormat { .. }));
    }
}
