use tracing::instrument;

use crate::batch::{BatchOrchestrator, BatchReport, CancelHandle};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::kicker;
use crate::model::*;
use crate::transport::Transport;

/// The main entry point for scraping kicker.de.
///
/// `KickerClient` owns a rate-limited [`Transport`] and exposes methods to
/// fetch single matches, list the fixtures of a season and run whole batches.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> kicker_scraper::Result<()> {
/// use kicker_scraper::KickerClient;
///
/// let client = KickerClient::new()?;
/// let fixtures = client.list_season_matches("2024-25").await?;
/// println!("Found {} fixtures", fixtures.len());
/// # Ok(())
/// # }
/// ```
pub struct KickerClient {
    transport: Transport,
    config: ScraperConfig,
}

impl KickerClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;
        Ok(Self { transport, config })
    }

    /// Create a client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure proxies, TLS or other transport
    /// details. Timeouts of `config` are not applied to `client`.
    pub fn with_client(client: reqwest::Client, config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::with_client(client, config.request_delay());
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch and extract a single match detail page.
    #[instrument(skip(self))]
    pub async fn fetch_match(&self, address: &str) -> Result<Match> {
        kicker::detail::fetch_match(&self.transport, address, &self.config).await
    }

    /// List all fixtures of a season such as `2024-25`.
    #[instrument(skip(self))]
    pub async fn list_season_matches(&self, season_id: &str) -> Result<SeasonMatchList> {
        let season: Season = season_id.parse()?;
        kicker::discovery::list_season_matches(&self.transport, &self.config.base_url, season).await
    }

    /// Scrape every fixture of the given seasons.
    ///
    /// See [`BatchOrchestrator::run`] for the meaning of the progress arguments.
    #[instrument(skip(self, season_ids, progress))]
    pub async fn run_batch(
        &self,
        season_ids: &[impl AsRef<str>],
        progress: impl FnMut(usize, usize, &str),
    ) -> BatchReport {
        self.orchestrator().run(season_ids, progress).await
    }

    /// Like [`run_batch`](Self::run_batch), stoppable through `cancel`.
    #[instrument(skip(self, season_ids, progress, cancel))]
    pub async fn run_batch_with_cancel(
        &self,
        season_ids: &[impl AsRef<str>],
        cancel: CancelHandle,
        progress: impl FnMut(usize, usize, &str),
    ) -> BatchReport {
        self.orchestrator()
            .with_cancel(cancel)
            .run(season_ids, progress)
            .await
    }

    /// A batch orchestrator sharing this client's transport and rate limit.
    pub fn orchestrator(&self) -> BatchOrchestrator<'_, Transport> {
        BatchOrchestrator::new(&self.transport, self.config.clone())
    }
}
