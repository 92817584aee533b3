//! # kicker-scraper
//!
//! A Rust library for scraping Bundesliga match data from [kicker.de](https://www.kicker.de).
//!
//! Match pages have changed layout many times over the years, so every
//! field (score, date, goals, lineups) is read through an ordered list of
//! extraction strategies, strongest first. What a page does not yield is
//! filled with a flagged default and listed in [`Match::issues`] instead of
//! failing the match.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn example() -> kicker_scraper::Result<()> {
//! use kicker_scraper::KickerClient;
//!
//! let client = KickerClient::new()?;
//!
//! let result = client
//!     .fetch_match("https://www.kicker.de/gladbach-gegen-leverkusen-2024-bundesliga-4862162/schema")
//!     .await?;
//! println!("{} {} {}", result.home_team.name, result.score.value, result.away_team.name);
//!
//! let report = client
//!     .run_batch(&["2024-25"], |done, total, status| println!("{done}/{total} {status}"))
//!     .await;
//! println!("{} matches scraped", report.matches().count());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod transport;

pub(crate) mod kicker;

pub use batch::{BatchOrchestrator, BatchReport, BatchState, CancelHandle, MatchResult, SeasonReport};
pub use client::KickerClient;
pub use config::{ScraperConfig, SpeedProfile, TeamNames};
pub use error::{ExtractionIssue, Field, KickerError, Result};
pub use model::*;
pub use resolve::{CuratedRoster, Rosters};
pub use transport::{PageSource, Transport};
