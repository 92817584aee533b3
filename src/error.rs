use ::scraper::error::SelectorErrorKind;
use std::num::ParseIntError;

use serde::Serialize;

/// All errors that can occur while fetching or discovering kicker.de matches.
#[derive(thiserror::Error, Debug)]
pub enum KickerError {
    /// HTTP request failed (network, DNS, TLS, connection refused, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The request or the connection attempt timed out.
    #[error("request timed out for {url}")]
    Timeout { url: String },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A match address does not follow the `{home}-gegen-{away}-{year}-` pattern.
    #[error("not a match address: {address}")]
    AddressFormat { address: String },

    /// A season identifier is not of the form `2024-25`.
    #[error("invalid season identifier: {season}")]
    InvalidSeason { season: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Failed to parse an integer from scraped text.
    #[error("failed to parse integer: {0}")]
    IntParse(#[from] ParseIntError),

    /// Bundled or injected JSON data could not be read.
    #[error("invalid data table: {0}")]
    Data(#[from] serde_json::Error),
}

impl KickerError {
    /// Whether the failure came from the network rather than from the page.
    ///
    /// Presentation layers use this to tell "network unavailable" apart from
    /// "no data for this match".
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            KickerError::Http { .. }
                | KickerError::Timeout { .. }
                | KickerError::UnexpectedStatus { .. }
                | KickerError::ResponseBody { .. }
        )
    }
}

impl<'a> From<SelectorErrorKind<'a>> for KickerError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        KickerError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KickerError>;

/// A match field whose extraction can fall back to a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Score,
    Date,
    Goals,
    HomeLineup,
    AwayLineup,
}

/// A non-fatal problem found while extracting a single match.
///
/// Issues never abort extraction; the affected field is populated with a
/// documented low-confidence value and the issue is recorded on the match.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum ExtractionIssue {
    /// A tier produced a candidate outside the plausibility bounds.
    #[error("implausible {field} candidate: {candidate}")]
    Ambiguous { field: Field, candidate: String },

    /// Every tier of the cascade came back empty.
    #[error("no {field} found, using placeholder")]
    Empty { field: Field },

    /// Fewer entries were found than expected.
    #[error("{field}: found {found} of {expected}")]
    Incomplete {
        field: Field,
        found: usize,
        expected: usize,
    },

    /// A name could not be placed on either side and the default was used.
    #[error("side of {name} could not be determined")]
    UnresolvedSide { name: String },

    /// The goal tally disagrees with the score shown on the page.
    #[error("goal tally {tally} differs from page score {page}")]
    ScoreMismatch { tally: String, page: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        let timeout = KickerError::Timeout {
            url: "https://www.kicker.de".to_string(),
        };
        assert!(timeout.is_network());

        let address = KickerError::AddressFormat {
            address: "https://www.kicker.de/news".to_string(),
        };
        assert!(!address.is_network());
    }

    #[test]
    fn test_issue_messages() {
        let issue = ExtractionIssue::Incomplete {
            field: Field::HomeLineup,
            found: 9,
            expected: 11,
        };
        assert_eq!(issue.to_string(), "home_lineup: found 9 of 11");
    }
}
