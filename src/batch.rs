//! Sequential scraping of whole seasons.
//!
//! For each requested season the orchestrator discovers the fixtures, then
//! fetches them one by one with the configured pause in between. A failing
//! match or season is recorded and the run goes on; only cancellation stops
//! it early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::{KickerError, Result};
use crate::kicker::{detail, discovery};
use crate::model::{Match, Season};
use crate::transport::PageSource;

/// Where a batch run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Discovering { season: String },
    Fetching { season: String, index: usize },
    Done,
    /// Discovery failed for every requested season.
    Failed,
    Cancelled,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchState::Done | BatchState::Failed | BatchState::Cancelled)
    }
}

/// Cooperative cancellation flag, checked between matches.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one fixture.
#[derive(Debug)]
pub struct MatchResult {
    pub address: String,
    pub expected_matchday: u8,
    pub outcome: Result<Match>,
}

#[derive(Debug)]
pub struct SeasonReport {
    pub season_id: String,
    pub matches: Vec<MatchResult>,
    /// Set when the fixtures of this season could not be listed.
    pub discovery_error: Option<KickerError>,
}

#[derive(Debug)]
pub struct BatchReport {
    pub seasons: Vec<SeasonReport>,
    pub state: BatchState,
}

impl BatchReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &MatchResult> {
        self.seasons.iter().flat_map(|s| &s.matches)
    }

    /// Successfully extracted matches, in fetch order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.outcomes().filter_map(|r| r.outcome.as_ref().ok())
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.seasons
            .into_iter()
            .flat_map(|s| s.matches)
            .filter_map(|r| r.outcome.ok())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &KickerError)> {
        self.outcomes()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.address.as_str(), e)))
    }
}

/// Runs discovery and match extraction over a list of seasons.
///
/// One request is in flight at a time. The pause between fetches is taken
/// from the config given at construction and does not change during a run.
pub struct BatchOrchestrator<'s, S: PageSource> {
    source: &'s S,
    config: ScraperConfig,
    state: BatchState,
    cancel: CancelHandle,
}

impl<'s, S: PageSource> BatchOrchestrator<'s, S> {
    pub fn new(source: &'s S, config: ScraperConfig) -> Self {
        Self {
            source,
            config,
            state: BatchState::Idle,
            cancel: CancelHandle::default(),
        }
    }

    /// Use an existing cancellation flag, e.g. one shared with a UI.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Scrape every fixture of `season_ids` (e.g. `"2024-25"`).
    ///
    /// `progress` is called after each fixture with the number of completed
    /// fixtures, the number discovered so far and a status line.
    #[instrument(skip_all, fields(seasons = season_ids.len()))]
    pub async fn run(
        &mut self,
        season_ids: &[impl AsRef<str>],
        mut progress: impl FnMut(usize, usize, &str),
    ) -> BatchReport {
        let delay = self.config.request_delay();
        let mut seasons = vec![];
        let mut completed = 0;
        let mut total = 0;
        // Set only when a cancel check skipped remaining work.
        let mut stopped_early = false;

        for season_id in season_ids {
            let season_id = season_id.as_ref().trim().to_string();
            if self.cancel.is_cancelled() {
                stopped_early = true;
                break;
            }

            self.state = BatchState::Discovering {
                season: season_id.clone(),
            };
            let discovered = match season_id.parse::<Season>() {
                Ok(season) => {
                    discovery::list_season_matches(self.source, &self.config.base_url, season)
                        .await
                        .map(|list| (season, list))
                }
                Err(e) => Err(e),
            };
            let (season, fixtures) = match discovered {
                Ok(found) => found,
                Err(e) => {
                    warn!(season = %season_id, error = %e, "season discovery failed");
                    seasons.push(SeasonReport {
                        season_id,
                        matches: vec![],
                        discovery_error: Some(e),
                    });
                    continue;
                }
            };
            total += fixtures.len();
            info!(season = %season_id, fixtures = fixtures.len(), "season discovered");

            let mut matches = vec![];
            for (index, fixture) in fixtures.into_iter().enumerate() {
                if self.cancel.is_cancelled() {
                    stopped_early = true;
                    break;
                }
                self.state = BatchState::Fetching {
                    season: season_id.clone(),
                    index,
                };

                let outcome = detail::fetch_match(self.source, &fixture.address, &self.config)
                    .await
                    .map(|mut m| {
                        m.season = season;
                        m.matchday = Some(fixture.expected_matchday);
                        m
                    });
                if let Err(e) = &outcome {
                    warn!(address = %fixture.address, error = %e, "match failed");
                }
                sleep(delay).await;

                completed += 1;
                let status = format!(
                    "{season_id} matchday {}: {}",
                    fixture.expected_matchday, fixture.address
                );
                progress(completed, total, &status);

                matches.push(MatchResult {
                    address: fixture.address,
                    expected_matchday: fixture.expected_matchday,
                    outcome,
                });
            }

            seasons.push(SeasonReport {
                season_id,
                matches,
                discovery_error: None,
            });
        }

        self.state = if stopped_early {
            BatchState::Cancelled
        } else if !seasons.is_empty() && seasons.iter().all(|s| s.discovery_error.is_some()) {
            BatchState::Failed
        } else {
            BatchState::Done
        };
        debug!(state = ?self.state, completed, total, "batch finished");

        BatchReport {
            seasons,
            state: self.state.clone(),
        }
    }
}
